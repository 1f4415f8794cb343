//! Catalog SQL
//!
//! Every identifier column is cast to `text` so it decodes as `String`
//! regardless of the catalog domain type it is declared with.

use eddi_core::ObjectCategory;

pub(crate) const LIST_TABLES: &str =
    "SELECT table_name::text FROM information_schema.tables WHERE table_schema = 'public'";

pub(crate) const LIST_VIEWS: &str =
    "SELECT table_name::text FROM information_schema.views WHERE table_schema = 'public'";

pub(crate) const LIST_FUNCTIONS: &str =
    "SELECT routine_name::text FROM information_schema.routines WHERE routine_schema = 'public'";

pub(crate) const LIST_SEQUENCES: &str =
    "SELECT sequence_name::text FROM information_schema.sequences WHERE sequence_schema = 'public'";

pub(crate) const LIST_INDEXES: &str =
    "SELECT indexname::text FROM pg_indexes WHERE schemaname = 'public'";

pub(crate) const LIST_CONSTRAINTS: &str = "
    SELECT c.conname::text
    FROM pg_constraint c
    JOIN pg_namespace n ON n.oid = c.connamespace
    WHERE n.nspname = 'public'";

pub(crate) const LIST_TRIGGERS: &str = "
    SELECT t.tgname::text
    FROM pg_trigger t
    JOIN pg_class c ON c.oid = t.tgrelid
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = 'public'
      AND NOT t.tgisinternal";

pub(crate) const LIST_MATERIALIZED_VIEWS: &str =
    "SELECT matviewname::text FROM pg_matviews WHERE schemaname = 'public'";

pub(crate) const LIST_PROCEDURES: &str = "
    SELECT p.proname::text
    FROM pg_proc p
    JOIN pg_namespace n ON n.oid = p.pronamespace
    WHERE n.nspname = 'public'
      AND p.prokind = 'p'";

pub(crate) const LIST_SCHEMAS: &str = "
    SELECT nspname::text
    FROM pg_namespace
    WHERE nspname NOT IN ('information_schema', 'pg_catalog')";

/// Listing query for a category
pub(crate) fn listing(category: ObjectCategory) -> &'static str {
    match category {
        ObjectCategory::Tables => LIST_TABLES,
        ObjectCategory::Views => LIST_VIEWS,
        ObjectCategory::Functions => LIST_FUNCTIONS,
        ObjectCategory::Sequences => LIST_SEQUENCES,
        ObjectCategory::Indexes => LIST_INDEXES,
        ObjectCategory::Constraints => LIST_CONSTRAINTS,
        ObjectCategory::Triggers => LIST_TRIGGERS,
        ObjectCategory::MaterializedViews => LIST_MATERIALIZED_VIEWS,
        ObjectCategory::Procedures => LIST_PROCEDURES,
        ObjectCategory::Schemas => LIST_SCHEMAS,
    }
}

pub(crate) const COLUMNS: &str = "
    SELECT column_name::text,
           data_type::text,
           character_maximum_length::int4,
           is_nullable::text
    FROM information_schema.columns
    WHERE table_schema = 'public'
      AND table_name = $1
    ORDER BY ordinal_position";

pub(crate) const ROUTINE: &str = "
    SELECT p.proname::text,
           pg_catalog.pg_get_function_arguments(p.oid),
           COALESCE(pg_catalog.pg_get_function_result(p.oid), ''),
           p.prosrc
    FROM pg_proc p
    JOIN pg_namespace n ON n.oid = p.pronamespace
    WHERE n.nspname = 'public'
      AND p.proname = $1
    LIMIT 1";

/// Sequence with the column that owns it, if any
pub(crate) const SEQUENCE: &str = "
    SELECT s.relname::text,
           pg_catalog.pg_get_serial_sequence(quote_ident(t.relname), a.attname::text),
           a.attname::text
    FROM pg_class s
    JOIN pg_namespace n ON n.oid = s.relnamespace
    LEFT JOIN pg_depend d
           ON d.objid = s.oid
          AND d.classid = 'pg_class'::regclass
          AND d.refclassid = 'pg_class'::regclass
          AND d.deptype IN ('a', 'i')
    LEFT JOIN pg_class t ON t.oid = d.refobjid
    LEFT JOIN pg_attribute a ON a.attrelid = d.refobjid AND a.attnum = d.refobjsubid
    WHERE s.relkind = 'S'
      AND n.nspname = 'public'
      AND s.relname = $1
    LIMIT 1";

pub(crate) const INDEX_DEFINITION: &str = "
    SELECT indexname::text, indexdef
    FROM pg_indexes
    WHERE schemaname = 'public'
      AND indexname = $1
    LIMIT 1";

pub(crate) const CONSTRAINT_DEFINITION: &str = "
    SELECT c.conname::text, pg_catalog.pg_get_constraintdef(c.oid)
    FROM pg_constraint c
    JOIN pg_namespace n ON n.oid = c.connamespace
    WHERE n.nspname = 'public'
      AND c.conname = $1
    LIMIT 1";

pub(crate) const TRIGGER_DEFINITION: &str = "
    SELECT t.tgname::text, pg_catalog.pg_get_triggerdef(t.oid)
    FROM pg_trigger t
    JOIN pg_class c ON c.oid = t.tgrelid
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = 'public'
      AND t.tgname = $1
    LIMIT 1";

pub(crate) const MATERIALIZED_VIEW_DEFINITION: &str = "
    SELECT c.relname::text, pg_catalog.pg_get_viewdef(c.oid)
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE c.relkind = 'm'
      AND n.nspname = 'public'
      AND c.relname = $1
    LIMIT 1";

/// Definition query for the categories that carry reconstructed DDL
pub(crate) fn definition(category: ObjectCategory) -> Option<&'static str> {
    match category {
        ObjectCategory::Indexes => Some(INDEX_DEFINITION),
        ObjectCategory::Constraints => Some(CONSTRAINT_DEFINITION),
        ObjectCategory::Triggers => Some(TRIGGER_DEFINITION),
        ObjectCategory::MaterializedViews => Some(MATERIALIZED_VIEW_DEFINITION),
        _ => None,
    }
}

pub(crate) const SCHEMA: &str = "
    SELECT nspname::text, pg_catalog.pg_get_userbyid(nspowner)::text
    FROM pg_namespace
    WHERE nspname = $1";

pub(crate) fn explain_json(sql: &str, analyze: bool) -> String {
    if analyze {
        format!("EXPLAIN (FORMAT JSON, ANALYZE, BUFFERS, VERBOSE) {}", sql)
    } else {
        format!("EXPLAIN (FORMAT JSON, VERBOSE) {}", sql)
    }
}

pub(crate) fn explain_text(sql: &str, analyze: bool) -> String {
    if analyze {
        format!("EXPLAIN (ANALYZE, BUFFERS, VERBOSE) {}", sql)
    } else {
        format!("EXPLAIN (VERBOSE) {}", sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_a_listing() {
        for category in ObjectCategory::ALL {
            assert!(listing(category).trim_start().starts_with("SELECT"));
        }
    }

    #[test]
    fn test_definition_queries_cover_ddl_categories() {
        assert!(definition(ObjectCategory::Indexes).is_some());
        assert!(definition(ObjectCategory::MaterializedViews).is_some());
        assert!(definition(ObjectCategory::Tables).is_none());
        assert!(definition(ObjectCategory::Schemas).is_none());
    }

    #[test]
    fn test_explain_statements() {
        assert_eq!(
            explain_json("select 1", true),
            "EXPLAIN (FORMAT JSON, ANALYZE, BUFFERS, VERBOSE) select 1"
        );
        assert_eq!(explain_text("select 1", false), "EXPLAIN (VERBOSE) select 1");
    }

    #[test]
    fn test_listing_reads_the_matching_catalog() {
        let expected = [
            (ObjectCategory::Tables, "information_schema.tables"),
            (ObjectCategory::Views, "information_schema.views"),
            (ObjectCategory::Functions, "information_schema.routines"),
            (ObjectCategory::Sequences, "information_schema.sequences"),
            (ObjectCategory::Indexes, "pg_indexes"),
            (ObjectCategory::Constraints, "pg_constraint"),
            (ObjectCategory::Triggers, "pg_trigger"),
            (ObjectCategory::MaterializedViews, "pg_matviews"),
            (ObjectCategory::Procedures, "pg_proc"),
            (ObjectCategory::Schemas, "pg_namespace"),
        ];
        for (category, catalog) in expected {
            assert!(listing(category).contains(catalog), "{} should read {}", category, catalog);
        }

        assert!(LIST_TRIGGERS.contains("NOT t.tgisinternal"));
        assert!(LIST_PROCEDURES.contains("p.prokind = 'p'"));
        assert!(LIST_SCHEMAS.contains("NOT IN ('information_schema', 'pg_catalog')"));
    }

    #[test]
    fn test_definition_query_per_category() {
        assert_eq!(definition(ObjectCategory::Indexes), Some(INDEX_DEFINITION));
        assert_eq!(definition(ObjectCategory::Constraints), Some(CONSTRAINT_DEFINITION));
        assert_eq!(definition(ObjectCategory::Triggers), Some(TRIGGER_DEFINITION));
        assert_eq!(definition(ObjectCategory::MaterializedViews), Some(MATERIALIZED_VIEW_DEFINITION));
        for category in [
            ObjectCategory::Tables,
            ObjectCategory::Views,
            ObjectCategory::Functions,
            ObjectCategory::Procedures,
            ObjectCategory::Sequences,
            ObjectCategory::Schemas,
        ] {
            assert_eq!(definition(category), None);
        }
    }

    #[test]
    fn test_lookups_bind_the_object_name() {
        for sql in [COLUMNS, ROUTINE, SEQUENCE, INDEX_DEFINITION, CONSTRAINT_DEFINITION, SCHEMA] {
            assert!(sql.contains("= $1"));
        }
        assert!(COLUMNS.contains("ORDER BY ordinal_position"));
        assert!(MATERIALIZED_VIEW_DEFINITION.contains("c.relkind = 'm'"));
    }

    #[test]
    fn test_plain_explain_statements() {
        assert_eq!(explain_json("select 1", false), "EXPLAIN (FORMAT JSON, VERBOSE) select 1");
        assert_eq!(
            explain_text("select 1", true),
            "EXPLAIN (ANALYZE, BUFFERS, VERBOSE) select 1"
        );
    }
}
