//! 门票资格校验
//!
//! 酒店与活动相关的读写操作都要求用户持有满足条件的门票：
//! 1. 存在报名记录 (enrollment)
//! 2. 报名下存在门票，且门票类型存在
//! 3. 门票不是线上 (remote) 票
//! 4. (酒店) 门票类型包含酒店
//! 5. 门票已支付
//!
//! 校验结果以 [`Eligibility`] 返回，由调用方映射为各自的错误码。

use crate::entities::{
    TicketStatus, enrollment_entity as enrollments, ticket_entity as tickets,
    ticket_type_entity as ticket_types,
};
use crate::error::{AppError, AppResult};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

/// 门票需要满足的条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketRequirement {
    pub allow_remote: bool,
    pub requires_hotel: bool,
    pub requires_payment: bool,
}

impl TicketRequirement {
    /// 酒店：线下、含酒店、已支付
    pub const HOTEL: Self = Self {
        allow_remote: false,
        requires_hotel: true,
        requires_payment: true,
    };

    /// 活动：线下、已支付
    pub const ACTIVITY: Self = Self {
        allow_remote: false,
        requires_hotel: false,
        requires_payment: true,
    };
}

/// 校验时读取到的门票信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSnapshot {
    pub ticket_id: i64,
    pub enrollment_id: i64,
    pub status: TicketStatus,
    pub is_remote: bool,
    pub includes_hotel: bool,
}

impl TicketSnapshot {
    fn new(ticket: tickets::Model, ticket_type: ticket_types::Model) -> Self {
        Self {
            ticket_id: ticket.id,
            enrollment_id: ticket.enrollment_id,
            status: ticket.status,
            is_remote: ticket_type.is_remote,
            includes_hotel: ticket_type.includes_hotel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible(TicketSnapshot),
    NoEnrollment,
    NoTicket,
    RemoteTicket,
    HotelNotIncluded,
    Unpaid,
}

impl Eligibility {
    /// 按固定顺序判定：先资格类拒绝，最后才是未支付
    pub fn evaluate(
        has_enrollment: bool,
        ticket: Option<TicketSnapshot>,
        requirement: TicketRequirement,
    ) -> Self {
        if !has_enrollment {
            return Eligibility::NoEnrollment;
        }
        let Some(ticket) = ticket else {
            return Eligibility::NoTicket;
        };
        if ticket.is_remote && !requirement.allow_remote {
            return Eligibility::RemoteTicket;
        }
        if requirement.requires_hotel && !ticket.includes_hotel {
            return Eligibility::HotelNotIncluded;
        }
        if requirement.requires_payment && ticket.status != TicketStatus::Paid {
            return Eligibility::Unpaid;
        }
        Eligibility::Eligible(ticket)
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible(_))
    }

    /// 未支付统一映射为 402，其余拒绝由调用方决定
    pub fn or_deny(self, denied: impl FnOnce() -> AppError) -> AppResult<TicketSnapshot> {
        match self {
            Eligibility::Eligible(ticket) => Ok(ticket),
            Eligibility::Unpaid => Err(AppError::PaymentRequired),
            _ => Err(denied()),
        }
    }
}

/// 读取用户的报名与门票并判定资格
pub async fn check_eligibility<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    requirement: TicketRequirement,
) -> AppResult<Eligibility> {
    let Some(enrollment) = enrollments::Entity::find()
        .filter(enrollments::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        return Ok(Eligibility::NoEnrollment);
    };

    let ticket = tickets::Entity::find()
        .filter(tickets::Column::EnrollmentId.eq(enrollment.id))
        .find_also_related(ticket_types::Entity)
        .one(db)
        .await?
        .and_then(|(ticket, ticket_type)| {
            ticket_type.map(|ticket_type| TicketSnapshot::new(ticket, ticket_type))
        });

    let eligibility = Eligibility::evaluate(true, ticket, requirement);
    if !eligibility.is_eligible() {
        log::info!("User {user_id} is not eligible: {eligibility:?}");
    }
    Ok(eligibility)
}
