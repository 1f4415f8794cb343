//! Database recommendation engine
//!
//! Two decision tables are supported:
//!
//! * [`DecisionTable::Flat`] (Variant A) maps four flat answers to a product,
//!   wraps it in a deployment qualifier and prices it from [`BASE_MONTHLY_COSTS`].
//! * [`DecisionTable::Tree`] (Variant B) walks a nature / structure / origin
//!   tree and attaches a fixed justification instead of a price.
//!
//! Both are pure functions of their slot set.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::slots::{AppOrigin, DataNature, DataStructure, FlatSlots, TreeSlots};
use crate::domain::ticket::TicketId;
use crate::CoreError;

/// Monthly base cost per product, in dollars
pub const BASE_MONTHLY_COSTS: [(&str, f64); 6] = [
    ("Oracle", 500.0),
    ("MySQL", 200.0),
    ("PostgreSQL", 250.0),
    ("MongoDB", 200.0),
    ("Neo4j", 400.0),
    ("SQL Server", 450.0),
];

/// Cost factor applied for redundant Multi-AZ infrastructure
pub const MULTI_AZ_COST_MULTIPLIER: f64 = 1.75;

lazy_static! {
    static ref PARENTHESISED: Regex = Regex::new(r"\(([^)]+)\)").expect("valid regex");
}

/// Which decision table the recommender uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionTable {
    /// Variant A, flat slots with a cost model
    #[default]
    Flat,
    /// Variant B, decision tree with justifications
    Tree,
}

impl FromStr for DecisionTable {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "a" => Ok(DecisionTable::Flat),
            "tree" | "b" => Ok(DecisionTable::Tree),
            other => Err(CoreError::ValidationError(format!(
                "Unknown decision table '{}', expected 'flat' or 'tree'",
                other
            ))),
        }
    }
}

impl fmt::Display for DecisionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionTable::Flat => write!(f, "flat"),
            DecisionTable::Tree => write!(f, "tree"),
        }
    }
}

/// Deployment wrapper placed around a base recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentQualifier {
    /// Redundant deployment for workloads that cannot tolerate downtime
    MultiAz,
    /// Cheap deployment for workloads that can
    SingleInstanceWithSnapshot,
}

impl DeploymentQualifier {
    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            DeploymentQualifier::MultiAz => "Multi-AZ Deployment",
            DeploymentQualifier::SingleInstanceWithSnapshot => "Single Instance with Snapshot",
        }
    }

    /// Wrap a base recommendation, e.g. `Multi-AZ Deployment (PostgreSQL)`
    pub fn wrap(&self, base: &str) -> String {
        format!("{} ({})", self.label(), base)
    }
}

impl fmt::Display for DeploymentQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one recommendation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Product name surfaced to the user
    pub recommended_database: String,
    /// Deployment wrapper, if any
    pub deployment_qualifier: Option<DeploymentQualifier>,
    /// Formatted monthly cost, Variant A only
    pub estimated_cost: Option<String>,
    /// Fixed justification, Variant B only
    pub reason: Option<String>,
    /// Ticket id, attached at submission time
    pub ticket_id: Option<TicketId>,
}

impl Recommendation {
    /// Full label including the deployment wrapper
    pub fn qualified_name(&self) -> String {
        match self.deployment_qualifier {
            Some(qualifier) => qualifier.wrap(&self.recommended_database),
            None => self.recommended_database.clone(),
        }
    }

    /// Attach a ticket id
    pub fn with_ticket(mut self, ticket_id: TicketId) -> Self {
        self.ticket_id = Some(ticket_id);
        self
    }
}

/// Base product for the flat table, by priority
fn flat_base_product(slots: &FlatSlots) -> &'static str {
    if slots.is_oracle_only() {
        "Oracle"
    } else if slots.is_structured() {
        if slots.is_single_key() {
            "MySQL or PostgreSQL"
        } else if slots.is_complex() {
            "PostgreSQL or SQL Server (if Tier 1)"
        } else {
            "PostgreSQL"
        }
    } else if slots.is_complex() {
        "Neo4j"
    } else {
        "MongoDB"
    }
}

/// Product name inside the first parenthesised group, or the whole label
pub fn inner_product_name(label: &str) -> &str {
    match PARENTHESISED.captures(label).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => label.trim(),
    }
}

/// Monthly base cost for a product name; unknown names cost nothing
pub fn base_monthly_cost(product: &str) -> f64 {
    BASE_MONTHLY_COSTS
        .iter()
        .find(|(name, _)| *name == product)
        .map(|(_, cost)| *cost)
        .unwrap_or(0.0)
}

/// `$<cost> per month` with two decimals
pub fn format_monthly_cost(cost: f64) -> String {
    format!("${:.2} per month", cost)
}

/// Variant A recommendation
pub fn recommend_flat(slots: &FlatSlots) -> Recommendation {
    let base = flat_base_product(slots);
    let can_handle_downtime = slots.can_handle_downtime();

    let qualifier = if !can_handle_downtime {
        Some(DeploymentQualifier::MultiAz)
    } else if !slots.is_oracle_only() {
        Some(DeploymentQualifier::SingleInstanceWithSnapshot)
    } else {
        None
    };

    let qualified = match qualifier {
        Some(q) => q.wrap(base),
        None => base.to_string(),
    };

    // Priced by the inner name of the qualified label, so compound
    // recommendations such as "MySQL or PostgreSQL" fall through to zero.
    let product = inner_product_name(&qualified).to_string();
    let mut cost = base_monthly_cost(&product);
    if !can_handle_downtime {
        cost *= MULTI_AZ_COST_MULTIPLIER;
    }

    Recommendation {
        recommended_database: product,
        deployment_qualifier: qualifier,
        estimated_cost: Some(format_monthly_cost(cost)),
        reason: None,
        ticket_id: None,
    }
}

/// Variant B recommendation
pub fn recommend_tree(slots: &TreeSlots) -> Recommendation {
    let (database, reason): (String, String) =
        match (slots.data_nature, slots.data_structure, slots.app_origin) {
            (
                Some(DataNature::Transactional),
                Some(DataStructure::Structured),
                Some(AppOrigin::CfgDeveloped),
            ) => {
                if !slots.acid_required {
                    (
                        "MySQL".into(),
                        "MySQL is a lightweight relational database suited to transactional workloads without strict ACID requirements.".into(),
                    )
                } else if slots.open_source {
                    (
                        "PostgreSQL".into(),
                        "PostgreSQL is a fully ACID-compliant open-source relational database.".into(),
                    )
                } else if slots.ms_licensing {
                    (
                        "MS SQL Server".into(),
                        "MS SQL Server provides ACID compliance and fits the existing Microsoft licensing.".into(),
                    )
                } else {
                    (
                        "PostgreSQL".into(),
                        "PostgreSQL provides ACID compliance without additional licensing costs.".into(),
                    )
                }
            }
            (
                Some(DataNature::Transactional),
                Some(DataStructure::Structured),
                Some(AppOrigin::VendorApplication),
            ) => match &slots.vendor_recommended_db {
                Some(vendor_db) => (
                    vendor_db.clone(),
                    format!("The vendor recommends {} for this application.", vendor_db),
                ),
                None => (
                    "Contact DBA Team".into(),
                    "The vendor did not specify a database, the DBA team will review the request.".into(),
                ),
            },
            (Some(DataNature::Transactional), Some(DataStructure::Unstructured), _) => (
                "MongoDB".into(),
                "MongoDB handles unstructured transactional data with a flexible document model.".into(),
            ),
            (Some(DataNature::Analytics), _, _) => (
                "PostgreSQL with Analytics extensions".into(),
                "Analytical workloads are served by PostgreSQL with columnar and analytics extensions.".into(),
            ),
            _ => (
                "No recommendation".into(),
                "The answers provided do not match a supported configuration.".into(),
            ),
        };

    Recommendation {
        recommended_database: database,
        deployment_qualifier: None,
        estimated_cost: None,
        reason: Some(reason),
        ticket_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::slots::{COMPLEX_RELATIONSHIPS, ORACLE_ONLY, SINGLE_KEY_ACCESS};

    fn flat(app: Option<&str>, feature: Option<&str>, rel: Option<&str>, downtime: Option<&str>) -> FlatSlots {
        FlatSlots {
            app_type: app.map(String::from),
            feature_type: feature.map(String::from),
            relationship_type: rel.map(String::from),
            downtime_tolerance: downtime.map(String::from),
        }
    }

    #[test]
    fn test_unstructured_downtime_tolerant_is_mongodb() {
        let rec = recommend_flat(&flat(Some("Unstructured data"), Some("No"), None, Some("Yes")));
        assert_eq!(rec.recommended_database, "MongoDB");
        assert_eq!(rec.qualified_name(), "Single Instance with Snapshot (MongoDB)");
        assert_eq!(rec.estimated_cost.as_deref(), Some("$200.00 per month"));
    }

    #[test]
    fn test_oracle_only_stays_unwrapped_when_tolerant() {
        for rel in [None, Some(SINGLE_KEY_ACCESS), Some(COMPLEX_RELATIONSHIPS)] {
            for app in [None, Some("Structured data"), Some("Unstructured")] {
                let rec = recommend_flat(&flat(app, Some(ORACLE_ONLY), rel, Some("Yes")));
                assert_eq!(rec.recommended_database, "Oracle");
                assert_eq!(rec.deployment_qualifier, None);
                assert_eq!(rec.estimated_cost.as_deref(), Some("$500.00 per month"));
            }
        }
    }

    #[test]
    fn test_oracle_only_without_downtime_is_multi_az() {
        let rec = recommend_flat(&flat(None, Some(ORACLE_ONLY), None, Some("No")));
        assert_eq!(rec.qualified_name(), "Multi-AZ Deployment (Oracle)");
        assert_eq!(rec.recommended_database, "Oracle");
        assert_eq!(rec.estimated_cost.as_deref(), Some("$875.00 per month"));
    }

    #[test]
    fn test_structured_single_key() {
        let rec = recommend_flat(&flat(Some("Structured data"), Some("No"), Some(SINGLE_KEY_ACCESS), Some("Yes")));
        assert_eq!(rec.recommended_database, "MySQL or PostgreSQL");
        // Compound names are not in the cost table
        assert_eq!(rec.estimated_cost.as_deref(), Some("$0.00 per month"));
    }

    #[test]
    fn test_structured_complex_keeps_first_parenthesised_group() {
        let rec = recommend_flat(&flat(Some("Structured"), None, Some(COMPLEX_RELATIONSHIPS), Some("Yes")));
        assert_eq!(rec.recommended_database, "PostgreSQL or SQL Server (if Tier 1");
        assert_eq!(rec.estimated_cost.as_deref(), Some("$0.00 per month"));
    }

    #[test]
    fn test_structured_plain_postgres_multi_az_cost() {
        let rec = recommend_flat(&flat(Some("Structured"), None, None, Some("No")));
        assert_eq!(rec.recommended_database, "PostgreSQL");
        assert_eq!(rec.deployment_qualifier, Some(DeploymentQualifier::MultiAz));
        assert_eq!(rec.estimated_cost.as_deref(), Some("$437.50 per month"));
    }

    #[test]
    fn test_unstructured_complex_is_neo4j() {
        let rec = recommend_flat(&flat(Some("Graph data"), None, Some(COMPLEX_RELATIONSHIPS), None));
        assert_eq!(rec.recommended_database, "Neo4j");
        assert_eq!(rec.estimated_cost.as_deref(), Some("$400.00 per month"));
    }

    #[test]
    fn test_multi_az_multiplier_for_every_priced_product() {
        for (product, base) in BASE_MONTHLY_COSTS {
            let label = DeploymentQualifier::MultiAz.wrap(product);
            let cost = base_monthly_cost(inner_product_name(&label)) * MULTI_AZ_COST_MULTIPLIER;
            assert_eq!(format_monthly_cost(cost), format!("${:.2} per month", base * 1.75));
        }
    }

    #[test]
    fn test_recommend_flat_is_deterministic() {
        let slots = flat(Some("Structured"), None, Some(SINGLE_KEY_ACCESS), Some("No"));
        assert_eq!(recommend_flat(&slots), recommend_flat(&slots));
    }

    #[test]
    fn test_inner_product_name() {
        assert_eq!(inner_product_name("Oracle "), "Oracle");
        assert_eq!(inner_product_name("Multi-AZ Deployment ( Neo4j )"), "Neo4j");
        assert_eq!(base_monthly_cost("DB2"), 0.0);
    }

    fn tree() -> TreeSlots {
        TreeSlots {
            data_nature: Some(DataNature::Transactional),
            data_structure: Some(DataStructure::Structured),
            app_origin: Some(AppOrigin::CfgDeveloped),
            ..TreeSlots::default()
        }
    }

    #[test]
    fn test_tree_cfg_developed_branches() {
        let no_acid = recommend_tree(&tree());
        assert_eq!(no_acid.recommended_database, "MySQL");

        let open_source = recommend_tree(&TreeSlots { acid_required: true, open_source: true, ..tree() });
        assert_eq!(open_source.recommended_database, "PostgreSQL");

        let ms = recommend_tree(&TreeSlots { acid_required: true, ms_licensing: true, ..tree() });
        assert_eq!(ms.recommended_database, "MS SQL Server");

        let proprietary = recommend_tree(&TreeSlots { acid_required: true, ..tree() });
        assert_eq!(proprietary.recommended_database, "PostgreSQL");
        assert!(proprietary.estimated_cost.is_none());
        assert!(proprietary.reason.is_some());
    }

    #[test]
    fn test_tree_vendor_application() {
        let vendor = TreeSlots { app_origin: Some(AppOrigin::VendorApplication), ..tree() };
        assert_eq!(recommend_tree(&vendor).recommended_database, "Contact DBA Team");

        let with_db = TreeSlots { vendor_recommended_db: Some("Oracle".into()), ..vendor };
        assert_eq!(recommend_tree(&with_db).recommended_database, "Oracle");
    }

    #[test]
    fn test_tree_other_branches() {
        let unstructured = TreeSlots { data_structure: Some(DataStructure::Unstructured), app_origin: None, ..tree() };
        assert_eq!(recommend_tree(&unstructured).recommended_database, "MongoDB");

        let analytics = TreeSlots { data_nature: Some(DataNature::Analytics), data_structure: None, ..tree() };
        assert_eq!(recommend_tree(&analytics).recommended_database, "PostgreSQL with Analytics extensions");

        assert_eq!(recommend_tree(&TreeSlots::default()).recommended_database, "No recommendation");
    }

    #[test]
    fn test_decision_table_parse() {
        assert_eq!("Tree".parse::<DecisionTable>().unwrap(), DecisionTable::Tree);
        assert_eq!("flat".parse::<DecisionTable>().unwrap(), DecisionTable::Flat);
        assert!("v3".parse::<DecisionTable>().is_err());
    }

    #[test]
    fn test_tree_recommendation_carries_attached_ticket() {
        let rec = recommend_tree(&tree());
        assert!(rec.ticket_id.is_none());

        let rec = rec.with_ticket(TicketId::from_number(4821));
        assert_eq!(rec.ticket_id.as_ref().map(TicketId::as_str), Some("DB-4821"));
        assert_eq!(serde_json::to_value(&rec).unwrap()["ticket_id"], "DB-4821");
    }
}
