//! Typed slot sets
//!
//! The dialogue manager stores slots as an open string-keyed bag. Each
//! decision table reads its own explicit structure instead, built once from
//! the tracker by `from_tracker`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::dialogue::Tracker;
use crate::CoreResult;

/// `feature_type` value that pins the recommendation to Oracle
pub const ORACLE_ONLY: &str = "Yes, Oracle-only";
/// `relationship_type` value for key/value style access
pub const SINGLE_KEY_ACCESS: &str = "Single-key access only";
/// `relationship_type` value for relational schemas
pub const COMPLEX_RELATIONSHIPS: &str = "Complex relationships or relational schema";

/// Variant A (flat) slot set.
///
/// `downtime_tolerance` defaults to `"Yes"` when the slot is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatSlots {
    /// Free text describing the application; looked at for a `Structured` marker
    pub app_type: Option<String>,
    /// Whether Oracle-only features are needed
    pub feature_type: Option<String>,
    /// Data access / relationship pattern
    pub relationship_type: Option<String>,
    /// Whether the application can tolerate downtime
    pub downtime_tolerance: Option<String>,
}

impl FlatSlots {
    /// Read the flat slot set from a tracker
    pub fn from_tracker(tracker: &Tracker) -> CoreResult<Self> {
        Ok(Self {
            app_type: tracker.slot_text("app_type")?,
            feature_type: tracker.slot_text("feature_type")?,
            relationship_type: tracker.slot_text("relationship_type")?,
            downtime_tolerance: tracker.slot_text("downtime_tolerance")?,
        })
    }

    /// `app_type` mentions structured data
    pub fn is_structured(&self) -> bool {
        self.app_type
            .as_deref()
            .map(|app_type| app_type.contains("Structured"))
            .unwrap_or(false)
    }

    /// Oracle-only features are required
    pub fn is_oracle_only(&self) -> bool {
        self.feature_type.as_deref() == Some(ORACLE_ONLY)
    }

    /// Only single-key access is needed
    pub fn is_single_key(&self) -> bool {
        self.relationship_type.as_deref() == Some(SINGLE_KEY_ACCESS)
    }

    /// Complex relationships are needed
    pub fn is_complex(&self) -> bool {
        self.relationship_type.as_deref() == Some(COMPLEX_RELATIONSHIPS)
    }

    /// Downtime is acceptable (default when unset)
    pub fn can_handle_downtime(&self) -> bool {
        self.downtime_tolerance.as_deref().unwrap_or("Yes") == "Yes"
    }
}

/// Nature of the workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataNature {
    /// OLTP style workload
    Transactional,
    /// Reporting / analytical workload
    Analytics,
}

impl FromStr for DataNature {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transactional" => Ok(DataNature::Transactional),
            "analytics" | "analytical" => Ok(DataNature::Analytics),
            _ => Err(()),
        }
    }
}

/// Shape of the stored data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataStructure {
    /// Tabular, schema-first data
    Structured,
    /// Documents, blobs, free-form data
    Unstructured,
}

impl FromStr for DataStructure {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(DataStructure::Structured),
            "unstructured" => Ok(DataStructure::Unstructured),
            _ => Err(()),
        }
    }
}

/// Who builds the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppOrigin {
    /// Built in house
    CfgDeveloped,
    /// Bought from a vendor
    VendorApplication,
}

impl FromStr for AppOrigin {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cfg developed" => Ok(AppOrigin::CfgDeveloped),
            "vendor application" => Ok(AppOrigin::VendorApplication),
            _ => Err(()),
        }
    }
}

/// Variant B (tree) slot set.
///
/// Unrecognised enumerations read as `None`, which the decision tree treats
/// as an unmatched combination. Yes/no answers default to "no".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSlots {
    /// `data_nature`
    pub data_nature: Option<DataNature>,
    /// `data_structure`
    pub data_structure: Option<DataStructure>,
    /// `app_type`
    pub app_origin: Option<AppOrigin>,
    /// `acid_compliance`
    pub acid_required: bool,
    /// `is_open_source`
    pub open_source: bool,
    /// `ms_licensing`
    pub ms_licensing: bool,
    /// `vendor_recommended_db`
    pub vendor_recommended_db: Option<String>,
    /// `app_architect`, carried to the ticket notification
    pub app_architect: Option<String>,
    /// `is_reviewed`, carried to the ticket notification
    pub is_reviewed: Option<String>,
    /// `epic_link`, carried to the ticket notification
    pub epic_link: Option<String>,
    /// `has_sysid`, carried to the ticket notification
    pub has_sysid: Option<String>,
}

impl TreeSlots {
    /// Read the tree slot set from a tracker
    pub fn from_tracker(tracker: &Tracker) -> CoreResult<Self> {
        Ok(Self {
            data_nature: parse_enum(tracker.slot_text("data_nature")?),
            data_structure: parse_enum(tracker.slot_text("data_structure")?),
            app_origin: parse_enum(tracker.slot_text("app_type")?),
            acid_required: is_yes(tracker.slot_text("acid_compliance")?),
            open_source: is_yes(tracker.slot_text("is_open_source")?),
            ms_licensing: is_yes(tracker.slot_text("ms_licensing")?),
            vendor_recommended_db: non_blank(tracker.slot_text("vendor_recommended_db")?),
            app_architect: non_blank(tracker.slot_text("app_architect")?),
            is_reviewed: non_blank(tracker.slot_text("is_reviewed")?),
            epic_link: non_blank(tracker.slot_text("epic_link")?),
            has_sysid: non_blank(tracker.slot_text("has_sysid")?),
        })
    }
}

fn parse_enum<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

fn is_yes(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("yes") | Some("y") | Some("true")
    )
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
