//! Dimension tag validation.
//!
//! Pure function, no side effects; called once per line during posting.

use uuid::Uuid;

use super::error::DimensionError;
use super::types::{DimensionValueInfo, TagSet};

/// Validates a line's dimension tags against an account's requirements.
///
/// Rules:
/// - every dimension type in `required` must carry a tag,
/// - every tagged value must exist, be active, and belong to the type it is
///   tagged under,
/// - extra tags beyond the required set are permitted.
///
/// `lookup` resolves a dimension value ID to its type and activity; it is
/// injected so this stays free of storage concerns.
///
/// # Errors
///
/// Returns the first violation found, checking tag legality before
/// required-type coverage so a bad tag is never masked by a coverage error.
pub fn validate_tags<L>(required: &[Uuid], tags: &TagSet, lookup: L) -> Result<(), DimensionError>
where
    L: Fn(Uuid) -> Option<DimensionValueInfo>,
{
    for (&tagged_type_id, &value_id) in tags {
        let info = lookup(value_id).ok_or(DimensionError::UnknownValue(value_id))?;
        if !info.is_active {
            return Err(DimensionError::InactiveValue(value_id));
        }
        if info.dimension_type_id != tagged_type_id {
            return Err(DimensionError::TypeMismatch {
                value_id,
                tagged_type_id,
            });
        }
    }

    for &type_id in required {
        if !tags.contains_key(&type_id) {
            return Err(DimensionError::MissingRequiredType(type_id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Directory {
        values: HashMap<Uuid, DimensionValueInfo>,
    }

    impl Directory {
        fn new() -> Self {
            Self {
                values: HashMap::new(),
            }
        }

        fn add(&mut self, type_id: Uuid, active: bool) -> Uuid {
            let value_id = Uuid::new_v4();
            self.values.insert(
                value_id,
                DimensionValueInfo {
                    dimension_type_id: type_id,
                    is_active: active,
                },
            );
            value_id
        }

        fn lookup(&self) -> impl Fn(Uuid) -> Option<DimensionValueInfo> + '_ {
            |id| self.values.get(&id).copied()
        }
    }

    #[test]
    fn test_valid_tags() {
        let mut dir = Directory::new();
        let cost_center = Uuid::new_v4();
        let value = dir.add(cost_center, true);

        let tags: TagSet = [(cost_center, value)].into_iter().collect();
        assert!(validate_tags(&[cost_center], &tags, dir.lookup()).is_ok());
    }

    #[test]
    fn test_missing_required_type() {
        let dir = Directory::new();
        let cost_center = Uuid::new_v4();

        let result = validate_tags(&[cost_center], &TagSet::new(), dir.lookup());
        assert_eq!(result, Err(DimensionError::MissingRequiredType(cost_center)));
    }

    #[test]
    fn test_unknown_value() {
        let dir = Directory::new();
        let cost_center = Uuid::new_v4();
        let bogus = Uuid::new_v4();

        let tags: TagSet = [(cost_center, bogus)].into_iter().collect();
        let result = validate_tags(&[], &tags, dir.lookup());
        assert_eq!(result, Err(DimensionError::UnknownValue(bogus)));
    }

    #[test]
    fn test_inactive_value() {
        let mut dir = Directory::new();
        let cost_center = Uuid::new_v4();
        let value = dir.add(cost_center, false);

        let tags: TagSet = [(cost_center, value)].into_iter().collect();
        let result = validate_tags(&[cost_center], &tags, dir.lookup());
        assert_eq!(result, Err(DimensionError::InactiveValue(value)));
    }

    #[test]
    fn test_type_mismatch() {
        let mut dir = Directory::new();
        let cost_center = Uuid::new_v4();
        let project = Uuid::new_v4();
        let project_value = dir.add(project, true);

        // Tag a project value under the cost center type
        let tags: TagSet = [(cost_center, project_value)].into_iter().collect();
        let result = validate_tags(&[], &tags, dir.lookup());
        assert_eq!(
            result,
            Err(DimensionError::TypeMismatch {
                value_id: project_value,
                tagged_type_id: cost_center,
            })
        );
    }

    #[test]
    fn test_extra_tags_permitted() {
        let mut dir = Directory::new();
        let cost_center = Uuid::new_v4();
        let project = Uuid::new_v4();
        let cc_value = dir.add(cost_center, true);
        let prj_value = dir.add(project, true);

        // Only the cost center is required; the project tag rides along.
        let tags: TagSet = [(cost_center, cc_value), (project, prj_value)]
            .into_iter()
            .collect();
        assert!(validate_tags(&[cost_center], &tags, dir.lookup()).is_ok());
    }
}
