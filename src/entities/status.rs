use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role. Fixed at creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[sea_orm(string_value = "USER")]
    User,
    #[sea_orm(string_value = "MENTOR")]
    Mentor,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Mentor => "MENTOR",
            Self::Admin => "ADMIN",
        }
    }

    /// Roles a visitor may pick at sign-up. Admins come from the bootstrap seed only.
    pub const fn is_self_registrable(self) -> bool {
        matches!(self, Self::User | Self::Mentor)
    }
}

/// Admin review state of a mentor profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum MentorStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl MentorStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Only approved mentors publish events and have them listed.
    pub const fn can_publish(self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Business lifecycle of a lead.
///
/// ```text
/// PENDING ──► VERIFIED ──► PURCHASED ──► PASSED
///    │           ▲ │            │
///    └──► REJECTED ◄┘           └──► (invited)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum LeadStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "VERIFIED")]
    Verified,
    #[sea_orm(string_value = "PURCHASED")]
    Purchased,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "PASSED")]
    Passed,
}

impl LeadStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Purchased => "PURCHASED",
            Self::Rejected => "REJECTED",
            Self::Passed => "PASSED",
        }
    }

    /// A mentor has paid for this lead at some point.
    pub const fn is_sold(self) -> bool {
        matches!(self, Self::Purchased | Self::Passed)
    }

    /// Admin review is allowed on anything not yet sold.
    pub const fn is_reviewable(self) -> bool {
        !self.is_sold()
    }

    /// Whether the lead occupies one of the event's slots.
    pub const fn holds_slot(self) -> bool {
        !matches!(self, Self::Rejected)
    }

    /// Reason a purchase may not start, or `None` when the lead is for sale.
    pub const fn purchase_blocker(self) -> Option<&'static str> {
        match self {
            Self::Verified => None,
            Self::Purchased | Self::Passed => Some("Lead already purchased"),
            Self::Pending => Some("Lead not verified yet"),
            Self::Rejected => Some("Lead was rejected"),
        }
    }

    /// Statuses a mentor may see in their lead list.
    pub const fn visible_to_mentor(self) -> bool {
        matches!(self, Self::Verified | Self::Purchased | Self::Passed)
    }
}

/// How a lead got (or did not get) verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    #[sea_orm(string_value = "AUTO_VERIFIED")]
    AutoVerified,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "MANUAL_VERIFIED")]
    ManualVerified,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// Admin decision on a lead. Also stored on each verification log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewDecision {
    #[sea_orm(string_value = "VERIFIED")]
    Verified,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl ReviewDecision {
    pub const fn lead_status(self) -> LeadStatus {
        match self {
            Self::Verified => LeadStatus::Verified,
            Self::Rejected => LeadStatus::Rejected,
        }
    }

    pub const fn verification_status(self) -> VerificationStatus {
        match self {
            Self::Verified => VerificationStatus::ManualVerified,
            Self::Rejected => VerificationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPurpose {
    #[sea_orm(string_value = "LEAD_PURCHASE")]
    LeadPurchase,
    #[sea_orm(string_value = "TICKET_PURCHASE")]
    TicketPurchase,
}

impl PaymentPurpose {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LeadPurchase => "LEAD_PURCHASE",
            Self::TicketPurchase => "TICKET_PURCHASE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "CREATED")]
    Created,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvitationStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PAID")]
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
}
