//! Per-component status aggregation
//!
//! Every registered component follows one contract when contributing to the
//! parent resource's status: normalize the desired management state, clear any
//! previously cached detail, and either mirror the component CR's own Ready
//! condition verbatim or mark the component Removed with an informational
//! severity. After one pass the per-component condition is always present.
//!
//! The helpers here are pure: the controller performs the live read (and
//! swallows non-404 read failures for the cycle) before calling in.

use crate::crd::{
    find_condition, ready_condition_type, ComponentCr, ComponentReleaseStatus, ConditionSet,
    ConditionSeverity, ConditionStatus, ManagementState, CONDITION_READY,
};

/// Outcome of one component's aggregation pass
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentAggregate {
    /// Aggregate readiness this component contributes to the parent summary
    pub aggregate: ConditionStatus,
    /// Normalized management state to record on the parent entry
    pub management_state: ManagementState,
    /// Detail mirrored from the component CR while enabled
    pub release: Option<ComponentReleaseStatus>,
}

/// Mirror one component's live status onto the parent condition set.
///
/// * Disabled components get a False `<Kind>Ready` condition whose reason is
///   the stringified management state (severity Info) and contribute an
///   Unknown aggregate.
/// * Enabled components have their own Ready condition mirrored verbatim; a
///   component that exists but has not reported Ready (or whose CR does not
///   exist yet) contributes False.
pub fn mirror_component_status<C: ComponentCr>(
    live: Option<&C>,
    desired: Option<ManagementState>,
    conditions: &mut ConditionSet,
) -> ComponentAggregate {
    let management_state = ManagementState::normalize(desired);
    let ready_type = ready_condition_type(C::KIND);

    if !management_state.is_managed() {
        conditions.mark_false_with_severity(
            ready_type,
            management_state.to_string(),
            format!("Component ManagementState is set to {management_state}"),
            ConditionSeverity::Info,
        );
        return ComponentAggregate {
            aggregate: ConditionStatus::Unknown,
            management_state,
            release: None,
        };
    }

    let release = live.and_then(|cr| cr.release()).cloned();
    let ready = live.and_then(|cr| find_condition(cr.conditions(), CONDITION_READY));

    let aggregate = match ready {
        Some(condition) => {
            conditions.mark_from(ready_type, condition);
            condition.status
        }
        None => {
            conditions.mark_false(
                ready_type,
                "NotReady",
                format!("{} has not reported a Ready condition", C::KIND),
            );
            ConditionStatus::False
        }
    };

    ComponentAggregate {
        aggregate,
        management_state,
        release,
    }
}

/// One component's contribution to the parent Ready summary
#[derive(Clone, Copy, Debug)]
pub struct ComponentReadiness {
    /// Component name
    pub name: &'static str,
    /// Whether the component is enabled
    pub enabled: bool,
    /// Aggregate status from [`mirror_component_status`]
    pub status: ConditionStatus,
}

/// Derive the parent's top-level Ready condition from the per-component
/// aggregates: True iff every enabled component mirrors True.
pub fn summarize_ready(conditions: &mut ConditionSet, components: &[ComponentReadiness]) {
    let not_ready: Vec<&str> = components
        .iter()
        .filter(|c| c.enabled && c.status != ConditionStatus::True)
        .map(|c| c.name)
        .collect();

    if not_ready.is_empty() {
        conditions.mark_true(
            CONDITION_READY,
            "ReconcileComplete",
            "all managed components are ready",
        );
    } else {
        conditions.mark_false(
            CONDITION_READY,
            "ComponentNotReady",
            format!("components not ready: {}", not_ready.join(", ")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{ComponentCrStatus, Condition, Dashboard, DashboardSpec};

    fn dashboard_with_ready(status: ConditionStatus, reason: &str, message: &str) -> Dashboard {
        let mut dashboard = Dashboard::new(Dashboard::INSTANCE, DashboardSpec::default());
        dashboard.status = Some(ComponentCrStatus {
            conditions: vec![Condition::new(CONDITION_READY, status, reason, message)],
            release: Some(ComponentReleaseStatus {
                name: "dashboard".to_string(),
                version: "1.4.0".to_string(),
            }),
        });
        dashboard
    }

    // =========================================================================
    // Mirroring Stories
    // =========================================================================

    /// Story: an enabled, ready component is mirrored verbatim
    ///
    /// Given the component's live Ready condition is {True, "Available"}, the
    /// parent's DashboardReady condition carries exactly that status, reason,
    /// and message, and the detail is copied.
    #[test]
    fn story_enabled_component_mirrors_verbatim() {
        let live = dashboard_with_ready(ConditionStatus::True, "Available", "2/2 available");
        let mut conditions = ConditionSet::default();

        let outcome = mirror_component_status(
            Some(&live),
            Some(ManagementState::Managed),
            &mut conditions,
        );

        assert_eq!(outcome.aggregate, ConditionStatus::True);
        assert_eq!(outcome.management_state, ManagementState::Managed);
        assert_eq!(outcome.release.as_ref().unwrap().version, "1.4.0");

        let mirrored = conditions.find("DashboardReady").unwrap();
        assert_eq!(mirrored.status, ConditionStatus::True);
        assert_eq!(mirrored.reason, "Available");
        assert_eq!(mirrored.message, "2/2 available");
    }

    /// Story: a disabled component reports Removed with detail cleared
    ///
    /// With management state Removed, the parent condition is False with the
    /// reason exactly "Removed", informational severity, a cleared detail
    /// field, and an Unknown aggregate.
    #[test]
    fn story_disabled_component_reports_management_state() {
        // Even if the CR still exists with status, disabled wins
        let live = dashboard_with_ready(ConditionStatus::True, "Available", "ok");
        let mut conditions = ConditionSet::default();

        let outcome = mirror_component_status(
            Some(&live),
            Some(ManagementState::Removed),
            &mut conditions,
        );

        assert_eq!(outcome.aggregate, ConditionStatus::Unknown);
        assert_eq!(outcome.management_state, ManagementState::Removed);
        assert!(outcome.release.is_none());

        let condition = conditions.find("DashboardReady").unwrap();
        assert_eq!(condition.status, ConditionStatus::False);
        assert_eq!(condition.reason, "Removed");
        assert_eq!(condition.severity, Some(ConditionSeverity::Info));
    }

    /// Story: an unset management state behaves exactly like Removed
    #[test]
    fn story_unset_state_is_removed() {
        let mut conditions = ConditionSet::default();
        let outcome = mirror_component_status::<Dashboard>(None, None, &mut conditions);

        assert_eq!(outcome.management_state, ManagementState::Removed);
        assert_eq!(conditions.find("DashboardReady").unwrap().reason, "Removed");
    }

    /// Story: an enabled component whose CR does not exist yet is not ready
    #[test]
    fn story_enabled_missing_cr_is_false() {
        let mut conditions = ConditionSet::default();
        let outcome = mirror_component_status::<Dashboard>(
            None,
            Some(ManagementState::Managed),
            &mut conditions,
        );

        assert_eq!(outcome.aggregate, ConditionStatus::False);
        assert!(outcome.release.is_none());
        let condition = conditions.find("DashboardReady").unwrap();
        assert_eq!(condition.reason, "NotReady");
    }

    /// Story: an enabled component without a Ready condition is not ready
    #[test]
    fn story_enabled_component_without_ready_condition() {
        let mut live = Dashboard::new(Dashboard::INSTANCE, DashboardSpec::default());
        live.status = Some(ComponentCrStatus::default());
        let mut conditions = ConditionSet::default();

        let outcome = mirror_component_status(
            Some(&live),
            Some(ManagementState::Managed),
            &mut conditions,
        );

        assert_eq!(outcome.aggregate, ConditionStatus::False);
        assert_eq!(conditions.find("DashboardReady").unwrap().reason, "NotReady");
    }

    /// Story: aggregation is idempotent
    ///
    /// Running the pass twice with no underlying change yields byte-identical
    /// conditions, including transition timestamps.
    #[test]
    fn story_mirroring_is_idempotent() {
        let live = dashboard_with_ready(ConditionStatus::True, "Available", "ok");
        let mut conditions = ConditionSet::default();

        mirror_component_status(Some(&live), Some(ManagementState::Managed), &mut conditions);
        let first = serde_json::to_vec(&conditions.clone().into_vec()).unwrap();

        mirror_component_status(Some(&live), Some(ManagementState::Managed), &mut conditions);
        let second = serde_json::to_vec(&conditions.into_vec()).unwrap();

        assert_eq!(first, second);
    }

    // =========================================================================
    // Ready Summary Stories
    // =========================================================================

    /// Story: all enabled components ready means the platform is Ready
    #[test]
    fn story_summary_true_when_all_enabled_ready() {
        let mut conditions = ConditionSet::default();
        summarize_ready(
            &mut conditions,
            &[
                ComponentReadiness {
                    name: "dashboard",
                    enabled: true,
                    status: ConditionStatus::True,
                },
                ComponentReadiness {
                    name: "pipelines",
                    enabled: false,
                    status: ConditionStatus::Unknown,
                },
            ],
        );

        let ready = conditions.find(CONDITION_READY).unwrap();
        assert_eq!(ready.status, ConditionStatus::True);
        assert_eq!(ready.reason, "ReconcileComplete");
    }

    /// Story: one unready enabled component flips the platform to not Ready
    #[test]
    fn story_summary_names_unready_components() {
        let mut conditions = ConditionSet::default();
        summarize_ready(
            &mut conditions,
            &[
                ComponentReadiness {
                    name: "dashboard",
                    enabled: true,
                    status: ConditionStatus::True,
                },
                ComponentReadiness {
                    name: "model-serving",
                    enabled: true,
                    status: ConditionStatus::False,
                },
            ],
        );

        let ready = conditions.find(CONDITION_READY).unwrap();
        assert_eq!(ready.status, ConditionStatus::False);
        assert!(ready.message.contains("model-serving"));
        assert!(!ready.message.contains("dashboard"));
    }

    /// Story: a platform with nothing enabled is trivially Ready
    #[test]
    fn story_summary_true_when_nothing_enabled() {
        let mut conditions = ConditionSet::default();
        summarize_ready(
            &mut conditions,
            &[ComponentReadiness {
                name: "dashboard",
                enabled: false,
                status: ConditionStatus::Unknown,
            }],
        );

        assert_eq!(
            conditions.find(CONDITION_READY).unwrap().status,
            ConditionStatus::True
        );
    }
}
