//! ORDER BY, GROUP BY and LIMIT/OFFSET fragments.

use crate::criteria::{Pagination, Sort};
use crate::error::QueryError;
use crate::sql::ColumnMap;

/// ` ORDER BY a ASC, b` with fields translated through `columns`.
pub fn build_order_by(sorts: &[Sort], columns: &ColumnMap) -> Result<String, QueryError> {
    if sorts.is_empty() {
        return Ok(String::new());
    }
    let parts = sorts
        .iter()
        .map(|s| {
            let column = columns.resolve(&s.field, "sort")?;
            Ok(match s.direction.as_sql() {
                Some(dir) => format!("{} {}", column, dir),
                None => column.to_string(),
            })
        })
        .collect::<Result<Vec<_>, QueryError>>()?;
    Ok(format!(" ORDER BY {}", parts.join(", ")))
}

/// ` GROUP BY a, b` with keys translated through `columns`.
pub fn build_group_by(groups: &[String], columns: &ColumnMap) -> Result<String, QueryError> {
    if groups.is_empty() {
        return Ok(String::new());
    }
    let parts = groups
        .iter()
        .map(|g| columns.resolve(g, "grouping"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!(" GROUP BY {}", parts.join(", ")))
}

/// ` LIMIT n OFFSET m`.
///
/// No page size means no limit: a page number alone renders nothing. A page
/// size without a page number defaults the page to 1, so `limit(10)` alone
/// renders `LIMIT 10 OFFSET 0`. Existing callers compare SQL text, so the
/// redundant `OFFSET 0` stays.
pub fn build_pagination(pagination: Pagination) -> String {
    if !pagination.has_page_size() {
        return String::new();
    }
    let page = Pagination {
        page_number: pagination.page_number.max(1),
        ..pagination
    };
    format!(" LIMIT {} OFFSET {}", page.page_size, page.offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Direction;

    #[test]
    fn order_by_omits_missing_direction() {
        let sorts = [Sort::asc("name"), Sort::new("age", Direction::None), Sort::desc("id")];
        assert_eq!(
            build_order_by(&sorts, &ColumnMap::empty()).unwrap(),
            " ORDER BY name ASC, age, id DESC"
        );
        assert_eq!(build_order_by(&[], &ColumnMap::empty()).unwrap(), "");
    }

    #[test]
    fn order_by_goes_through_whitelist() {
        let map = ColumnMap::new([("createdAt", "created_at")]).unwrap();
        assert_eq!(
            build_order_by(&[Sort::desc("createdAt")], &map).unwrap(),
            " ORDER BY created_at DESC"
        );
        assert!(build_order_by(&[Sort::asc("1; DROP TABLE x")], &map).is_err());
    }

    #[test]
    fn group_by_goes_through_whitelist() {
        let map = ColumnMap::new([("roleId", "role_id")]).unwrap();
        assert_eq!(build_group_by(&["roleId".into()], &map).unwrap(), " GROUP BY role_id");
        let err = build_group_by(&["nope".into()], &map).unwrap_err();
        assert!(matches!(err, QueryError::InvalidFieldName { context: "grouping", .. }));
    }

    #[test]
    fn pagination_variants() {
        assert_eq!(build_pagination(Pagination::default()), "");
        assert_eq!(build_pagination(Pagination::new(0, 10)), " LIMIT 10 OFFSET 0");
        assert_eq!(build_pagination(Pagination::new(2, 10)), " LIMIT 10 OFFSET 10");
        assert_eq!(build_pagination(Pagination::new(3, 0)), "");
    }
}
