// 🧭 Endpoint Resolver - Ordered rule cascade for intake sources
// Each intake record's graph source is decided by the first matching rule.
// Rules are data: appending a new source-determination rule never touches
// the existing ones.

use crate::record::{columns, normalize_name, normalize_survey_number, Record};
use serde::{Deserialize, Serialize};

/// Aquifer placeholder used when the surveyed system could not name one
pub const OTHER_AQUIFER: &str = "OTHER AQUIFER";

/// Surface-water placeholder for an unnamed source
pub const UNKNOWN_SOURCE: &str = "UNKNOWN";

/// Suffix appended to the basin name when the concrete source is unknown
pub const UNKNOWN_SOURCE_SUFFIX: &str = "Basin Unknown-Source";

// ============================================================================
// SOURCE RULES
// ============================================================================

/// One source-determination rule of the cascade.
/// Rules are mutually exclusive over their predicates; cascade order still
/// matters because Purchased takes the seller regardless of water type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceRule {
    /// Reuse + Self-Supplied → the system supplies itself (self-loop)
    ReuseSelfSupplied,

    /// Purchased → the seller system is the source
    Purchased,

    /// Ground Water + Self-Supplied → aquifer, or basin fallback
    GroundWaterSelfSupplied,

    /// Surface Water + Self-Supplied → named source, or basin fallback
    SurfaceWaterSelfSupplied,
}

impl SourceRule {
    /// Does this rule's predicate hold for the record?
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            SourceRule::ReuseSelfSupplied => {
                record.field_is(columns::WATER_TYPE, "Reuse")
                    && record.field_is(columns::SUPPLY_MODE, "Self-Supplied")
            }
            SourceRule::Purchased => record.field_is(columns::SUPPLY_MODE, "Purchased"),
            SourceRule::GroundWaterSelfSupplied => {
                record.field_is(columns::WATER_TYPE, "Ground Water")
                    && record.field_is(columns::SUPPLY_MODE, "Self-Supplied")
            }
            SourceRule::SurfaceWaterSelfSupplied => {
                record.field_is(columns::WATER_TYPE, "Surface Water")
                    && record.field_is(columns::SUPPLY_MODE, "Self-Supplied")
            }
        }
    }

    /// Resolve the source node id for a matched record.
    /// Returns None when the field the rule depends on is blank — that is a
    /// resolution failure, not a fatal error.
    pub fn resolve(&self, record: &Record) -> Option<String> {
        match self {
            SourceRule::ReuseSelfSupplied => record
                .str_field(columns::SURVEY_NUMBER)
                .map(normalize_survey_number),

            SourceRule::Purchased => record
                .str_field(columns::SELLER_SURVEY_NUMBER)
                .map(normalize_survey_number),

            SourceRule::GroundWaterSelfSupplied => {
                match record.str_field(columns::AQUIFER_NAME) {
                    Some(aquifer) if !aquifer.eq_ignore_ascii_case(OTHER_AQUIFER) => {
                        Some(normalize_name(aquifer))
                    }
                    _ => basin_fallback(record),
                }
            }

            SourceRule::SurfaceWaterSelfSupplied => {
                match record.str_field(columns::SOURCE_NAME) {
                    Some(source) if !source.eq_ignore_ascii_case(UNKNOWN_SOURCE) => {
                        Some(normalize_name(source))
                    }
                    _ => basin_fallback(record),
                }
            }
        }
    }
}

/// Basin + fixed unknown-source suffix, title-cased as one identifier
fn basin_fallback(record: &Record) -> Option<String> {
    record
        .str_field(columns::BASIN_NAME)
        .map(|basin| normalize_name(&format!("{} {}", basin, UNKNOWN_SOURCE_SUFFIX)))
}

// ============================================================================
// ENDPOINT RESOLVER
// ============================================================================

pub struct EndpointResolver {
    rules: Vec<SourceRule>,
}

impl EndpointResolver {
    /// Standard cascade, in evaluation order
    pub fn new() -> Self {
        EndpointResolver {
            rules: vec![
                SourceRule::ReuseSelfSupplied,
                SourceRule::Purchased,
                SourceRule::GroundWaterSelfSupplied,
                SourceRule::SurfaceWaterSelfSupplied,
            ],
        }
    }

    /// Resolve the source endpoint of an intake record.
    /// First matching rule wins; no match is a resolution failure (None).
    pub fn resolve_source(&self, record: &Record) -> Option<String> {
        for rule in &self.rules {
            if rule.matches(record) {
                return rule.resolve(record);
            }
        }
        None
    }

    /// Target of an intake record: always its own survey number
    pub fn resolve_target(&self, record: &Record) -> Option<String> {
        record
            .str_field(columns::SURVEY_NUMBER)
            .map(normalize_survey_number)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;

    fn intake_record() -> Record {
        Record::new(RecordKind::Intake, "intake.csv").with_str(columns::SURVEY_NUMBER, "10450")
    }

    #[test]
    fn test_reuse_self_supplied_is_a_self_loop() {
        let record = intake_record()
            .with_str(columns::WATER_TYPE, "Reuse")
            .with_str(columns::SUPPLY_MODE, "Self-Supplied");

        let resolver = EndpointResolver::new();
        assert_eq!(resolver.resolve_source(&record), Some("10450".to_string()));
        assert_eq!(resolver.resolve_target(&record), Some("10450".to_string()));
    }

    #[test]
    fn test_purchased_takes_seller_regardless_of_water_type() {
        let record = intake_record()
            .with_str(columns::WATER_TYPE, "Ground Water")
            .with_str(columns::SUPPLY_MODE, "Purchased")
            .with_str(columns::SELLER_SURVEY_NUMBER, " 20991 ");

        let resolver = EndpointResolver::new();
        assert_eq!(resolver.resolve_source(&record), Some("20991".to_string()));
    }

    #[test]
    fn test_ground_water_uses_aquifer_name() {
        let record = intake_record()
            .with_str(columns::WATER_TYPE, "Ground Water")
            .with_str(columns::SUPPLY_MODE, "Self-Supplied")
            .with_str(columns::AQUIFER_NAME, "OGALLALA AQUIFER");

        let resolver = EndpointResolver::new();
        assert_eq!(
            resolver.resolve_source(&record),
            Some("Ogallala Aquifer".to_string())
        );
    }

    #[test]
    fn test_other_aquifer_falls_back_to_basin_suffix() {
        let record = intake_record()
            .with_str(columns::WATER_TYPE, "Ground Water")
            .with_str(columns::SUPPLY_MODE, "Self-Supplied")
            .with_str(columns::AQUIFER_NAME, "OTHER AQUIFER")
            .with_str(columns::BASIN_NAME, "PANHANDLE");

        let resolver = EndpointResolver::new();
        assert_eq!(
            resolver.resolve_source(&record),
            Some("Panhandle Basin Unknown-Source".to_string())
        );
    }

    #[test]
    fn test_unknown_surface_source_falls_back_to_basin_suffix() {
        let record = intake_record()
            .with_str(columns::WATER_TYPE, "Surface Water")
            .with_str(columns::SUPPLY_MODE, "Self-Supplied")
            .with_str(columns::SOURCE_NAME, "UNKNOWN")
            .with_str(columns::BASIN_NAME, "RIO GRANDE");

        let resolver = EndpointResolver::new();
        assert_eq!(
            resolver.resolve_source(&record),
            Some("Rio Grande Basin Unknown-Source".to_string())
        );
    }

    #[test]
    fn test_named_surface_source_is_title_cased() {
        let record = intake_record()
            .with_str(columns::WATER_TYPE, "Surface Water")
            .with_str(columns::SUPPLY_MODE, "Self-Supplied")
            .with_str(columns::SOURCE_NAME, "LAKE TRAVIS");

        let resolver = EndpointResolver::new();
        assert_eq!(
            resolver.resolve_source(&record),
            Some("Lake Travis".to_string())
        );
    }

    #[test]
    fn test_no_rule_matched_is_a_resolution_failure() {
        let record = intake_record()
            .with_str(columns::WATER_TYPE, "Brackish")
            .with_str(columns::SUPPLY_MODE, "Self-Supplied");

        let resolver = EndpointResolver::new();
        assert_eq!(resolver.resolve_source(&record), None);
    }

    #[test]
    fn test_purchased_without_seller_is_a_resolution_failure() {
        let record = intake_record().with_str(columns::SUPPLY_MODE, "Purchased");

        let resolver = EndpointResolver::new();
        assert_eq!(resolver.resolve_source(&record), None);
    }

    #[test]
    fn test_reuse_rule_evaluated_before_ground_water() {
        // Reuse + Self-Supplied must not fall through to aquifer resolution
        let record = intake_record()
            .with_str(columns::WATER_TYPE, "Reuse")
            .with_str(columns::SUPPLY_MODE, "Self-Supplied")
            .with_str(columns::AQUIFER_NAME, "OGALLALA AQUIFER");

        let resolver = EndpointResolver::new();
        assert_eq!(resolver.resolve_source(&record), Some("10450".to_string()));
    }
}
