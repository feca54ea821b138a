// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

mod app_registration_test;
mod health_check;
pub mod helpers;
mod repositories;
mod stored_payment_methods_test;
