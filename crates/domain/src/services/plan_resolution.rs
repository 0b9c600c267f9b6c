//! Plan catalog and entitlement resolution.
//!
//! Lookups are exact and case-sensitive. An unknown plan code is always a
//! [`LookupError`]; the resolver never substitutes a default plan, since that
//! would silently grant entitlements nobody paid for.

use std::collections::{BTreeMap, HashMap};

use shared::validation::is_plan_code;

use crate::error::{LookupError, SnapshotError};
use crate::models::plan::{
    BillingSpec, EntitlementSet, GiftPackItem, PlanDefinition, RawPlan, SessionLimit,
};

/// Immutable plan table plus the storefront product mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanCatalog {
    plans: HashMap<String, PlanDefinition>,
    storefront: HashMap<String, String>,
}

impl PlanCatalog {
    /// Validates the raw plan and storefront tables.
    pub fn from_raw(
        plans: BTreeMap<String, RawPlan>,
        storefront: BTreeMap<String, String>,
    ) -> Result<Self, SnapshotError> {
        if plans.is_empty() {
            return Err(SnapshotError::EmptyPlanTable);
        }

        let mut catalog = Self::default();

        for (code, raw) in plans {
            if !is_plan_code(&code) {
                return Err(SnapshotError::InvalidPlanCode(code));
            }
            let session_limit = SessionLimit::from_raw(raw.session_count_limit).ok_or_else(|| {
                SnapshotError::InvalidSessionLimit {
                    plan: code.clone(),
                    value: raw.session_count_limit,
                }
            })?;
            let price = u64::try_from(raw.price).map_err(|_| SnapshotError::NegativePrice {
                plan: code.clone(),
                value: raw.price,
            })?;

            let definition = PlanDefinition {
                billing: BillingSpec::from_raw(&code, &raw.billing_plan, raw.gift_pack),
                code: code.clone(),
                price,
                session_limit,
                features: raw.features,
            };
            catalog.plans.insert(code, definition);
        }

        for (product, plan) in storefront {
            if !catalog.plans.contains_key(&plan) {
                return Err(SnapshotError::UnknownStorefrontPlan { product, plan });
            }
            catalog.storefront.insert(product, plan);
        }

        Ok(catalog)
    }

    pub fn get(&self, code: &str) -> Option<&PlanDefinition> {
        self.plans.get(code)
    }

    /// Plan codes in sorted order.
    pub fn plan_codes(&self) -> Vec<&str> {
        let mut codes: Vec<_> = self.plans.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn storefront_products(&self) -> usize {
        self.storefront.len()
    }

    fn storefront_plan(&self, product_id: &str) -> Option<&str> {
        self.storefront.get(product_id).map(String::as_str)
    }
}

/// Read-only resolver over a [`PlanCatalog`].
#[derive(Debug, Clone, Copy)]
pub struct PlanResolver<'a> {
    catalog: &'a PlanCatalog,
}

impl<'a> PlanResolver<'a> {
    pub fn new(catalog: &'a PlanCatalog) -> Self {
        Self { catalog }
    }

    /// Effective entitlements for `plan_code`.
    pub fn resolve_entitlements(&self, plan_code: &str) -> Result<EntitlementSet, LookupError> {
        self.catalog
            .get(plan_code)
            .map(EntitlementSet::from)
            .ok_or_else(|| LookupError::PlanNotFound(plan_code.to_string()))
    }

    /// Bundle contents of a gift pack plan.
    ///
    /// Empty for unknown plans, plans that are not gift packs, and gift packs
    /// whose bundle list could not be parsed at load time.
    pub fn expand_gift_pack(&self, plan_code: &str) -> &'a [GiftPackItem] {
        self.catalog
            .get(plan_code)
            .map(|plan| plan.billing.gift_pack_items())
            .unwrap_or(&[])
    }

    /// Plan code purchased through a storefront product id.
    pub fn resolve_storefront_purchase(&self, product_id: &str) -> Result<&'a str, LookupError> {
        let plan_code = self
            .catalog
            .storefront_plan(product_id)
            .ok_or_else(|| LookupError::StorefrontProductNotFound(product_id.to_string()))?;

        // Targets are validated at load; a miss here is still NotFound.
        self.catalog
            .get(plan_code)
            .map(|plan| plan.code.as_str())
            .ok_or_else(|| LookupError::PlanNotFound(plan_code.to_string()))
    }
}
