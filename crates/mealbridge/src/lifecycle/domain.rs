use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for donation and request records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    /// Syntactic check applied before any store access: opaque keys are
    /// non-empty, bounded, and drawn from a URL-safe alphabet.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= 64
            && self
                .0
                .bytes()
                .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which logical collection an item belongs to. One record shape covers both;
/// the tag replaces the source system's untyped two-collection union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Donation,
    Request,
}

impl ItemKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Donation => "donation",
            Self::Request => "request",
        }
    }
}

/// Lifecycle status chain. Items only ever advance one step at a time through
/// the order returned by [`ItemStatus::ordered`]; `Delivered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    New,
    Matched,
    InWarehouse,
    AwaitingDelivery,
    Delivered,
}

impl ItemStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::New,
            Self::Matched,
            Self::InWarehouse,
            Self::AwaitingDelivery,
            Self::Delivered,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Matched => "matched",
            Self::InWarehouse => "inwarehouse",
            Self::AwaitingDelivery => "awaitingdelivery",
            Self::Delivered => "delivered",
        }
    }

    /// The single legal successor, or `None` from the terminal state.
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::New => Some(Self::Matched),
            Self::Matched => Some(Self::InWarehouse),
            Self::InWarehouse => Some(Self::AwaitingDelivery),
            Self::AwaitingDelivery => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        Self::New
    }
}

/// What the caller is confirming alongside the status advance. Intents decide
/// which payload fields the executor writes in the same conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionIntent {
    #[default]
    None,
    DonateConfirm,
    AcceptConfirm,
}

impl TransitionIntent {
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::DonateConfirm => "donate-confirm",
            Self::AcceptConfirm => "accept-confirm",
        }
    }
}

/// Opaque acting identity supplied by the session layer. Donors,
/// beneficiaries, and admins all act through it; the engine only ever treats
/// it as an e-mail-shaped string for contact disclosure and claims.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActingIdentity(pub String);

impl fmt::Display for ActingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted item record shared by donations and requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub kind: ItemKind,
    pub status: ItemStatus,
    /// Donor e-mail on requests, beneficiary e-mail on donations. Set at
    /// creation or disclosed on the matching transition.
    pub counterpart_email: Option<String>,
    pub delivery_location: Option<String>,
    pub need_by: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemRecord {
    pub fn new(id: ItemId, kind: ItemKind, counterpart_email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            status: ItemStatus::New,
            counterpart_email,
            delivery_location: None,
            need_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of the single mutating endpoint. The claimed current status defaults
/// to `new`; the engine never re-reads the stored status before validating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionRequest {
    #[serde(default)]
    pub current_status: ItemStatus,
    #[serde(default)]
    pub intent: TransitionIntent,
    #[serde(default)]
    pub delivery_location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_need_by")]
    pub need_by: Option<NaiveDateTime>,
}

/// Success payload for a transition: the status the item now holds and which
/// collection the identifier resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub status: ItemStatus,
}

/// Intake body for the thin creation surface used by UI collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub kind: ItemKind,
    #[serde(default)]
    pub counterpart_email: Option<String>,
}

pub fn parse_need_by(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM ({err})"))
}

pub(crate) fn deserialize_optional_need_by<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_need_by(&value).map_err(serde::de::Error::custom))
        .transpose()
}
