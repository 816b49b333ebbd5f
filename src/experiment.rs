//! Deterministic two-arm experiment bucketing.
//!
//! Users are assigned to buckets by hashing their id together with the cohort id. The hash is
//! FNV-1a over the UTF-8 bytes, so assignments are reproducible across SDKs written in other
//! languages.
use crate::{
    schema::{CohortArm, CohortMembership},
    Error, Result,
};

/// Configuration of an experiment with a control and a treatment arm.
///
/// Buckets `[0, control_buckets)` belong to the control arm and
/// `[control_buckets, total_buckets)` to the treatment arm. Only the first `active_*` buckets of
/// each arm put users into the experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoArmExperiment {
    cohort_id: String,
    cohort_id_hash: u32,
    active_control_buckets: u32,
    control_buckets: u32,
    active_treatment_buckets: u32,
    treatment_buckets: u32,
}

impl TwoArmExperiment {
    /// Create an experiment with explicit bucket counts.
    ///
    /// ```
    /// # use promoted::TwoArmExperiment;
    /// let experiment = TwoArmExperiment::new("HOLD_OUT", 10, 50, 10, 50).unwrap();
    /// assert_eq!(experiment.total_buckets(), 100);
    /// ```
    pub fn new(
        cohort_id: impl Into<String>,
        active_control_buckets: i32,
        control_buckets: i32,
        active_treatment_buckets: i32,
        treatment_buckets: i32,
    ) -> Result<Self> {
        let cohort_id = cohort_id.into();
        if cohort_id.trim().is_empty() {
            return Err(Error::BlankCohortId);
        }
        let control_buckets = u32::try_from(control_buckets)
            .map_err(|_| Error::NegativeBucketCount { arm: "control" })?;
        let treatment_buckets = u32::try_from(treatment_buckets)
            .map_err(|_| Error::NegativeBucketCount { arm: "treatment" })?;
        let active_control_buckets = u32::try_from(active_control_buckets)
            .ok()
            .filter(|active| *active <= control_buckets)
            .ok_or(Error::ActiveBucketsOutOfRange { arm: "control" })?;
        let active_treatment_buckets = u32::try_from(active_treatment_buckets)
            .ok()
            .filter(|active| *active <= treatment_buckets)
            .ok_or(Error::ActiveBucketsOutOfRange { arm: "treatment" })?;

        Ok(TwoArmExperiment {
            cohort_id_hash: fnv1a_32(&cohort_id),
            cohort_id,
            active_control_buckets,
            control_buckets,
            active_treatment_buckets,
            treatment_buckets,
        })
    }

    /// Create a 100-bucket experiment split evenly between the arms, activating
    /// `control_percent` and `treatment_percent` of all users in the respective arm.
    ///
    /// Each percent must be in `[0, 50]`.
    pub fn new_50_50(
        cohort_id: impl Into<String>,
        control_percent: i32,
        treatment_percent: i32,
    ) -> Result<Self> {
        if !(0..=50).contains(&control_percent) {
            return Err(Error::PercentOutOfRange { arm: "control" });
        }
        if !(0..=50).contains(&treatment_percent) {
            return Err(Error::PercentOutOfRange { arm: "treatment" });
        }
        Self::new(cohort_id, control_percent, 50, treatment_percent, 50)
    }

    /// Compute the arm `user_id` is assigned to.
    ///
    /// Returns `None` when the user falls into an inactive bucket and is therefore not part of
    /// the experiment.
    pub fn check_membership(&self, user_id: &str) -> Option<CohortMembership> {
        let total_buckets = u64::from(self.total_buckets());
        if total_buckets == 0 {
            return None;
        }

        let hash = combine_hash(fnv1a_32(user_id), self.cohort_id_hash);
        let bucket = hash.unsigned_abs() % total_buckets;

        let active_control = u64::from(self.active_control_buckets);
        let control = u64::from(self.control_buckets);
        let active_treatment = u64::from(self.active_treatment_buckets);

        let arm = if bucket < active_control {
            CohortArm::Control
        } else if control <= bucket && bucket < control + active_treatment {
            CohortArm::Treatment
        } else {
            return None;
        };

        log::trace!(target: "promoted",
                    cohort_id:display = self.cohort_id,
                    user_id,
                    bucket,
                    arm:display = arm;
                    "checked experiment membership");

        Some(CohortMembership::new(self.cohort_id.clone(), arm))
    }

    /// Id of the experiment.
    pub fn cohort_id(&self) -> &str {
        &self.cohort_id
    }

    /// FNV-1a hash of the cohort id, computed once at construction.
    pub fn cohort_id_hash(&self) -> u32 {
        self.cohort_id_hash
    }

    /// Control buckets whose users are in the control arm.
    pub fn active_control_buckets(&self) -> u32 {
        self.active_control_buckets
    }

    /// Buckets reserved for the control arm.
    pub fn control_buckets(&self) -> u32 {
        self.control_buckets
    }

    /// Treatment buckets whose users are in the treatment arm.
    pub fn active_treatment_buckets(&self) -> u32 {
        self.active_treatment_buckets
    }

    /// Buckets reserved for the treatment arm.
    pub fn treatment_buckets(&self) -> u32 {
        self.treatment_buckets
    }

    /// Control plus treatment buckets.
    pub fn total_buckets(&self) -> u32 {
        self.control_buckets + self.treatment_buckets
    }
}

/// Order-dependent combination of two hashes.
fn combine_hash(first: u32, second: u32) -> i64 {
    let hash: i64 = 17;
    let hash = hash * 31 + i64::from(first);
    hash * 31 + i64::from(second)
}

/// 32-bit FNV-1a.
fn fnv1a_32(s: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for b in s.as_bytes() {
        hash ^= u32::from(*b);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}
