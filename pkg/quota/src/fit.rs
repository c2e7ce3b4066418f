use pkg_types::resource::{ResourceList, is_negative, less_than_or_equal, mask};

/// Check whether `requested` fits within `available`.
///
/// Returns `(true, {})` on success. Otherwise returns `false` with the
/// entries of `requested` that either exceed `available` or are negative.
/// Names that `available` does not constrain are unbounded.
pub fn quota_fits(requested: &ResourceList, available: &ResourceList) -> (bool, ResourceList) {
    let (_, mut exceeded) = less_than_or_equal(requested, available);
    // Negative amounts are always violations, whatever the cap.
    exceeded.extend(is_negative(requested));
    if exceeded.is_empty() {
        return (true, ResourceList::new());
    }
    (false, mask(requested, &exceeded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::convert_limit_to_resource_list;
    use pkg_types::quantity::Quantity;
    use pkg_types::quota::ResourceQuotaLimit;

    fn list(entries: &[(&str, &str)]) -> ResourceList {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Quantity::parse(v).unwrap()))
            .collect()
    }

    #[test]
    fn fits_when_everything_within_limits() {
        let requested = list(&[("pods", "5"), ("requestsMemory", "512Mi")]);
        let available = list(&[("pods", "5"), ("requestsMemory", "1Gi")]);
        assert_eq!(quota_fits(&requested, &available), (true, ResourceList::new()));
    }

    #[test]
    fn reports_requested_values_of_exceeded() {
        let requested = list(&[("pods", "6"), ("requestsCpu", "2"), ("secrets", "1")]);
        let available = list(&[("pods", "5"), ("requestsCpu", "1500m"), ("secrets", "10")]);
        let (ok, exceeded) = quota_fits(&requested, &available);
        assert!(!ok);
        assert_eq!(exceeded, list(&[("pods", "6"), ("requestsCpu", "2")]));
    }

    #[test]
    fn negative_values_fail_even_under_large_cap() {
        let requested = list(&[("pods", "-1"), ("secrets", "1")]);
        let available = list(&[("pods", "1000"), ("secrets", "10")]);
        assert_eq!(quota_fits(&requested, &available), (false, list(&[("pods", "-1")])));
    }

    #[test]
    fn negative_and_exceeded_are_both_reported() {
        let requested = list(&[("pods", "-1"), ("limitsCpu", "4"), ("secrets", "1")]);
        let available = list(&[("pods", "10"), ("limitsCpu", "2"), ("secrets", "10")]);
        assert_eq!(
            quota_fits(&requested, &available),
            (false, list(&[("limitsCpu", "4"), ("pods", "-1")]))
        );
    }

    #[test]
    fn negative_over_negative_cap_is_reported_once() {
        let requested = list(&[("pods", "-2")]);
        let available = list(&[("pods", "-5")]);
        let (ok, exceeded) = quota_fits(&requested, &available);
        assert!(!ok);
        assert_eq!(exceeded.len(), 1);
        assert_eq!(exceeded, list(&[("pods", "-2")]));
    }

    #[test]
    fn negative_and_unconstrained_is_still_reported() {
        let requested = list(&[("configMaps", "-2")]);
        let (ok, exceeded) = quota_fits(&requested, &ResourceList::new());
        assert!(!ok);
        assert_eq!(exceeded, list(&[("configMaps", "-2")]));
    }

    #[test]
    fn unconstrained_names_fit() {
        let requested = list(&[("limitsCpu", "64")]);
        let available = list(&[("pods", "1")]);
        assert!(quota_fits(&requested, &available).0);
    }

    #[test]
    fn empty_request_fits() {
        let available = list(&[("pods", "1")]);
        assert_eq!(
            quota_fits(&ResourceList::new(), &available),
            (true, ResourceList::new())
        );
    }

    #[test]
    fn limit_record_checked_against_smaller_limit() {
        let requested = convert_limit_to_resource_list(
            &serde_json::from_value::<ResourceQuotaLimit>(serde_json::json!({
                "limitsCpu": "4",
                "requestsStorageClassPVC": { "silver": "5" },
            }))
            .unwrap(),
        )
        .unwrap();
        assert_eq!(
            requested,
            list(&[
                ("limitsCpu", "4"),
                ("silver.storageclass.storage.k8s.io/persistentvolumeclaims", "5"),
            ])
        );

        let available = list(&[
            ("limitsCpu", "2"),
            ("silver.storageclass.storage.k8s.io/persistentvolumeclaims", "10"),
        ]);
        assert_eq!(
            quota_fits(&requested, &available),
            (false, list(&[("limitsCpu", "4")]))
        );
    }
}
