// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::models::payment::{
    Channel, ListStoredPaymentMethodsRequestData, PaymentMethodData,
    StoredPaymentMethodRequestDeleteData, User,
};

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct UserDto {
    pub id: i64,
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct ChannelDto {
    pub id: i64,
    #[validate(length(min = 1))]
    pub slug: String,
    pub name: String,
    #[validate(length(equal = 3))]
    pub currency_code: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ListStoredPaymentMethodsRequestDto {
    #[validate(nested)]
    pub user: UserDto,
    #[validate(nested)]
    pub channel: ChannelDto,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct StoredPaymentMethodDeleteRequestDto {
    #[validate(nested)]
    pub user: UserDto,
    #[validate(length(min = 1))]
    pub payment_method_id: String,
    #[validate(nested)]
    pub channel: ChannelDto,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ListStoredPaymentMethodsResponseDto {
    pub payment_methods: Vec<PaymentMethodData>,
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id,
            email: dto.email,
        }
    }
}

impl From<ChannelDto> for Channel {
    fn from(dto: ChannelDto) -> Self {
        Self {
            id: dto.id,
            slug: dto.slug,
            name: dto.name,
            currency_code: dto.currency_code,
        }
    }
}

impl From<ListStoredPaymentMethodsRequestDto> for ListStoredPaymentMethodsRequestData {
    fn from(dto: ListStoredPaymentMethodsRequestDto) -> Self {
        Self {
            user: dto.user.into(),
            channel: dto.channel.into(),
        }
    }
}

impl From<StoredPaymentMethodDeleteRequestDto> for StoredPaymentMethodRequestDeleteData {
    fn from(dto: StoredPaymentMethodDeleteRequestDto) -> Self {
        Self {
            user: dto.user.into(),
            payment_method_id: dto.payment_method_id,
            channel: dto.channel.into(),
        }
    }
}
