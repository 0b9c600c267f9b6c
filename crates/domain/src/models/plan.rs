//! Subscription plan model.
//!
//! Plans are loaded once per snapshot. The billing-plan field of the raw data
//! doubles as a JSON-encoded bundle list for gift packs; that ambiguity is
//! resolved into [`BillingSpec`] at load time so resolvers never re-parse it.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Names of every recognized entitlement flag, as spelled in catalog data.
pub const FEATURE_FLAG_NAMES: [&str; 6] = [
    "disableP2P",
    "modestBranding",
    "nativeCrypto",
    "telehealth",
    "video",
    "voice",
];

/// Entitlement flags granted by a plan.
///
/// Every field is required when deserializing, and unknown flags are
/// rejected, so a plan record that was not backfilled fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProFeatures {
    #[serde(rename = "disableP2P")]
    pub disable_p2p: bool,
    pub modest_branding: bool,
    pub native_crypto: bool,
    pub telehealth: bool,
    pub video: bool,
    pub voice: bool,
}

impl ProFeatures {
    /// All flags with their catalog names, in [`FEATURE_FLAG_NAMES`] order.
    pub fn flags(&self) -> [(&'static str, bool); 6] {
        [
            (FEATURE_FLAG_NAMES[0], self.disable_p2p),
            (FEATURE_FLAG_NAMES[1], self.modest_branding),
            (FEATURE_FLAG_NAMES[2], self.native_crypto),
            (FEATURE_FLAG_NAMES[3], self.telehealth),
            (FEATURE_FLAG_NAMES[4], self.video),
            (FEATURE_FLAG_NAMES[5], self.voice),
        ]
    }

    /// Looks up a flag by catalog name. `None` means the flag is not
    /// recognized, which is distinct from an explicit `false`.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.flags()
            .into_iter()
            .find(|(flag, _)| *flag == name)
            .map(|(_, enabled)| enabled)
    }
}

/// Session-count limit of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i64")]
pub enum SessionLimit {
    Unlimited,
    Capped(u32),
}

impl SessionLimit {
    /// Converts the raw catalog value: `-1` is unlimited, `0..` is a cap.
    pub fn from_raw(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::Unlimited),
            v if v >= 0 => u32::try_from(v).ok().map(Self::Capped),
            _ => None,
        }
    }
}

impl From<SessionLimit> for i64 {
    fn from(limit: SessionLimit) -> Self {
        match limit {
            SessionLimit::Unlimited => -1,
            SessionLimit::Capped(max) => i64::from(max),
        }
    }
}

/// One recurring plan bundled into a gift pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftPackItem {
    pub plan: String,
    pub quantity: u32,
    pub trial_months: u32,
}

/// How a plan is billed, decided once when the catalog loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingSpec {
    /// Free or one-time tier with no recurring billing plan.
    None,
    /// A single recurring billing plan.
    Simple(String),
    /// Several recurring plans bundled with a trial period.
    GiftPack(Vec<GiftPackItem>),
}

impl BillingSpec {
    /// Builds the billing spec from the raw catalog fields.
    ///
    /// A gift pack whose bundle list is malformed or empty is logged and
    /// treated as having no billing plan.
    pub fn from_raw(plan_code: &str, billing_plan: &str, gift_pack: bool) -> Self {
        let billing_plan = billing_plan.trim();

        if !gift_pack {
            return if billing_plan.is_empty() {
                Self::None
            } else {
                Self::Simple(billing_plan.to_string())
            };
        }

        match serde_json::from_str::<Vec<GiftPackItem>>(billing_plan) {
            Ok(items) if !items.is_empty() => Self::GiftPack(items),
            Ok(_) => {
                warn!(plan = plan_code, "Gift pack has an empty bundle list");
                Self::None
            }
            Err(e) => {
                warn!(plan = plan_code, error = %e, "Gift pack bundle list is malformed");
                Self::None
            }
        }
    }

    /// True when at least one recurring billing plan is attached.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn is_gift_pack(&self) -> bool {
        matches!(self, Self::GiftPack(_))
    }

    /// Bundle contents for gift packs, empty otherwise.
    pub fn gift_pack_items(&self) -> &[GiftPackItem] {
        match self {
            Self::GiftPack(items) => items,
            _ => &[],
        }
    }
}

/// A plan record as it appears in the catalog file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawPlan {
    #[serde(default)]
    pub billing_plan: String,
    #[serde(default)]
    pub gift_pack: bool,
    #[serde(default)]
    pub price: i64,
    pub session_count_limit: i64,
    pub features: ProFeatures,
}

/// A validated plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDefinition {
    pub code: String,
    pub billing: BillingSpec,
    /// Price in minor currency units, 0 when not applicable.
    pub price: u64,
    pub session_limit: SessionLimit,
    pub features: ProFeatures,
}

/// Effective entitlements for a resolved plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EntitlementSet {
    pub plan_code: String,
    pub features: ProFeatures,
    pub session_limit: SessionLimit,
    pub price: u64,
    pub recurring_billing: bool,
    pub gift_pack: bool,
}

impl From<&PlanDefinition> for EntitlementSet {
    fn from(plan: &PlanDefinition) -> Self {
        Self {
            plan_code: plan.code.clone(),
            features: plan.features,
            session_limit: plan.session_limit,
            price: plan.price,
            recurring_billing: plan.billing.is_recurring(),
            gift_pack: plan.billing.is_gift_pack(),
        }
    }
}
