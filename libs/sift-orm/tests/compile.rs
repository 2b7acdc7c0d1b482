//! Lowering tests: request data in, SQL shape out. No live database; the
//! generated statements are inspected as text the way SeaORM renders them.

use sea_orm::entity::prelude::*;
use sea_orm::{DbBackend, QueryFilter, QueryTrait};

use sift_core::{FieldKind, Filter, FilterRequest, SortSpec};
use sift_orm::{filter_to_condition, Error, FieldMap, SiftQueryExt};

#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: uuid::Uuid,
    pub name: String,
    pub employees: i64,
    pub active: bool,
    pub founded_on: chrono::NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn company_fields() -> FieldMap<Entity> {
    FieldMap::<Entity>::new()
        .insert("id", Column::Id, FieldKind::Uuid)
        .insert("name", Column::Name, FieldKind::String)
        .insert("employees", Column::Employees, FieldKind::I64)
        .insert("active", Column::Active, FieldKind::Bool)
        .insert("foundedonfrom", Column::FoundedOn, FieldKind::Date)
        .insert("foundedonto", Column::FoundedOn, FieldKind::Date)
}

fn request(pairs: &[(&str, &str)]) -> FilterRequest {
    pairs.iter().copied().collect()
}

fn where_sql(pairs: &[(&str, &str)]) -> String {
    let fmap = company_fields();
    let filter = Filter::build(&fmap, &request(pairs), true, true);
    Entity::find()
        .apply_filter(&filter, &fmap)
        .build(DbBackend::Sqlite)
        .to_string()
}

#[test]
fn containment_lowers_to_case_insensitive_like() {
    let sql = where_sql(&[("name", "acm")]);
    assert!(sql.contains("LOWER"), "{sql}");
    assert!(sql.contains("LIKE"), "{sql}");
    assert!(sql.contains("%acm%"), "{sql}");
}

#[test]
fn quoted_value_lowers_to_equality_not_like() {
    let sql = where_sql(&[("name", "\"Zeta\"")]);
    assert!(!sql.contains("LIKE"), "{sql}");
    assert!(sql.contains("LOWER"), "{sql}");
    assert!(sql.contains("zeta"), "{sql}");
}

#[test]
fn negated_string_keeps_null_rows() {
    let sql = where_sql(&[("name", "!acm")]);
    assert!(sql.contains("IS NULL"), "{sql}");
    assert!(sql.contains("NOT LIKE"), "{sql}");
}

#[test]
fn unknown_keys_leave_the_select_untouched() {
    let sql = where_sql(&[("flavor", "sweet")]);
    assert!(!sql.contains("WHERE"), "{sql}");
}

#[test]
fn uncoercible_value_lowers_to_contradiction() {
    let sql = where_sql(&[("employees", "abc")]);
    assert!(sql.contains("1=0"), "{sql}");
}

#[test]
fn repeated_values_lower_to_or() {
    let sql = where_sql(&[("name", "acm"), ("name", "glob")]);
    assert!(sql.contains(" OR "), "{sql}");
}

#[test]
fn date_range_keys_lower_to_inclusive_bounds() {
    let sql = where_sql(&[
        ("foundedonfrom", "2001-09-15"),
        ("foundedonto", "2014-06-30"),
    ]);
    assert!(sql.contains(">="), "{sql}");
    assert!(sql.contains("<="), "{sql}");
}

#[test]
fn empty_value_lowers_to_is_null() {
    let sql = where_sql(&[("name", "")]);
    assert!(sql.contains("IS NULL"), "{sql}");
}

#[test]
fn or_mode_with_false_default_is_contradiction_when_empty() {
    let fmap = company_fields();
    let filter = Filter::build(&fmap, &FilterRequest::new(), false, false);
    let cond = filter_to_condition(&filter, &fmap);
    let sql = Entity::find().filter(cond).build(DbBackend::Sqlite).to_string();
    assert!(sql.contains("1=0"), "{sql}");
}

#[test]
fn sort_lowers_to_chained_order_by() {
    let fmap = company_fields();
    let spec = SortSpec::from_signed_tokens("-name,employees").resolve(&fmap, "name");
    let sql = Entity::find()
        .apply_sort(&spec, &fmap)
        .unwrap()
        .build(DbBackend::Sqlite)
        .to_string();
    assert!(sql.contains("ORDER BY"), "{sql}");
    assert!(sql.contains("LOWER"), "{sql}");
    assert!(sql.contains("DESC"), "{sql}");
    assert!(sql.contains("ASC"), "{sql}");
    // Primary key first, tie-breaker after.
    let name_pos = sql.find("DESC").unwrap();
    let emp_pos = sql.find("ASC").unwrap();
    assert!(name_pos < emp_pos, "{sql}");
}

#[test]
fn unmapped_sort_field_fails_fast() {
    let fmap = company_fields();
    let spec = SortSpec::from_signed_tokens("bogus");
    let err = Entity::find().apply_sort(&spec, &fmap).err().unwrap();
    assert!(matches!(err, Error::UnknownField(f) if f == "bogus"));
}
