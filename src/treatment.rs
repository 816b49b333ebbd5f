use crate::schema::CohortMembership;

/// Decides whether the Delivery API treatment applies to a user.
///
/// Overrides the default rule, which applies the treatment unless the user is in the control arm.
pub trait ApplyTreatmentChecker {
    /// Whether the user should be ranked by the Delivery API.
    fn should_apply_treatment(&self, cohort_membership: Option<&CohortMembership>) -> bool;
}

impl<T: Fn(Option<&CohortMembership>) -> bool> ApplyTreatmentChecker for T {
    fn should_apply_treatment(&self, cohort_membership: Option<&CohortMembership>) -> bool {
        self(cohort_membership)
    }
}
