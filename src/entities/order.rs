//! ORD entity type - Laboratory order with per-stage production progress

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::prosthetic::Prosthetic;

/// Order status (production lifecycle)
///
/// The variants are listed in their usual order, but any status may be set
/// from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum OrderStatus {
    #[default]
    New,
    InProgress,
    TrialFitting,
    Corrections,
    ReadyForPickup,
    Completed,
}

impl OrderStatus {
    /// All statuses in lifecycle order
    pub fn all() -> &'static [OrderStatus] {
        &[
            OrderStatus::New,
            OrderStatus::InProgress,
            OrderStatus::TrialFitting,
            OrderStatus::Corrections,
            OrderStatus::ReadyForPickup,
            OrderStatus::Completed,
        ]
    }

    /// Position in the lifecycle, for sorting
    pub fn rank(self) -> usize {
        Self::all().iter().position(|s| *s == self).unwrap_or(0)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::New => write!(f, "new"),
            OrderStatus::InProgress => write!(f, "in-progress"),
            OrderStatus::TrialFitting => write!(f, "trial-fitting"),
            OrderStatus::Corrections => write!(f, "corrections"),
            OrderStatus::ReadyForPickup => write!(f, "ready-for-pickup"),
            OrderStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "new" => Ok(OrderStatus::New),
            "in-progress" | "inprogress" => Ok(OrderStatus::InProgress),
            "trial-fitting" | "trial" => Ok(OrderStatus::TrialFitting),
            "corrections" => Ok(OrderStatus::Corrections),
            "ready-for-pickup" | "ready" => Ok(OrderStatus::ReadyForPickup),
            "completed" | "done" => Ok(OrderStatus::Completed),
            _ => Err(format!(
                "Invalid order status: {}. Use new, in-progress, trial-fitting, corrections, ready-for-pickup, or completed",
                s
            )),
        }
    }
}

/// Production stage status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum StageStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::NotStarted => write!(f, "not-started"),
            StageStatus::InProgress => write!(f, "in-progress"),
            StageStatus::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "not-started" | "pending" => Ok(StageStatus::NotStarted),
            "in-progress" | "inprogress" => Ok(StageStatus::InProgress),
            "done" | "completed" => Ok(StageStatus::Done),
            _ => Err(format!(
                "Invalid stage status: {}. Use not-started, in-progress, or done",
                s
            )),
        }
    }
}

/// Progress record for one production stage, positionally aligned with
/// [`Order::stages`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageProgress {
    /// Employee or supplier name, empty when unassigned
    #[serde(default)]
    pub assignee: String,

    #[serde(default)]
    pub status: StageStatus,

    /// Set once, on the first transition into in-progress
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    /// Present only while the stage is done
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl StageProgress {
    /// Record a new assignee and status for this stage
    pub fn apply(&mut self, assignee: String, status: StageStatus, now: DateTime<Utc>) {
        if self.started_at.is_none() && status == StageStatus::InProgress {
            self.started_at = Some(now);
        }
        self.completed_at = match status {
            StageStatus::Done => Some(now),
            StageStatus::NotStarted | StageStatus::InProgress => None,
        };
        self.assignee = assignee;
        self.status = status;
    }
}

/// Data needed to open a new order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderInput {
    pub doctor_id: EntityId,
    pub patient_code: String,
    pub prosthetic_id: EntityId,
    pub deadline: NaiveDate,
    pub teeth_numbers: String,
    pub material: String,
    pub notes: Option<String>,
}

/// Fields to change on an existing order; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub doctor_id: Option<EntityId>,
    pub patient_code: Option<String>,
    pub prosthetic_id: Option<EntityId>,
    pub deadline: Option<NaiveDate>,
    pub teeth_numbers: Option<String>,
    pub material: Option<String>,
    /// `Some("")` clears the notes
    pub notes: Option<String>,
}

/// Laboratory order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique identifier (ORD-xxx)
    pub id: EntityId,

    /// Ordering doctor (DOC-xxx)
    pub doctor_id: EntityId,

    /// Patient code, free text
    pub patient_code: String,

    /// Catalog item (PROS-xxx)
    pub prosthetic_id: EntityId,

    pub deadline: NaiveDate,

    /// Comma-separated tooth numbers, e.g. "14, 15, 16"
    #[serde(default)]
    pub teeth_numbers: String,

    pub teeth_count: u32,

    #[serde(default)]
    pub material: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub status: OrderStatus,

    /// Unit price times tooth count, frozen at creation/edit time
    pub total_price: f64,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,

    /// Stage names copied from the catalog item at creation
    #[serde(default)]
    pub stages: Vec<String>,

    #[serde(default)]
    pub stage_progress: Vec<StageProgress>,
}

impl Entity for Order {
    const PREFIX: EntityPrefix = EntityPrefix::Ord;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.patient_code
    }
}

/// Count the teeth in a comma-separated list; never less than one
pub fn count_teeth(teeth_numbers: &str) -> u32 {
    let count = teeth_numbers
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .count();
    count.max(1) as u32
}

impl Order {
    /// Open a new order for a catalog item, snapshotting its stages
    pub fn new(input: OrderInput, prosthetic: &Prosthetic, now: DateTime<Utc>) -> Self {
        let stages = prosthetic.stages.clone();
        let stage_progress = vec![StageProgress::default(); stages.len()];
        let mut order = Self {
            id: EntityId::new(EntityPrefix::Ord),
            doctor_id: input.doctor_id,
            patient_code: input.patient_code,
            prosthetic_id: input.prosthetic_id,
            deadline: input.deadline,
            teeth_numbers: input.teeth_numbers,
            teeth_count: 1,
            material: input.material,
            notes: input.notes.filter(|n| !n.is_empty()),
            status: OrderStatus::New,
            total_price: 0.0,
            created_at: now,
            completed_at: None,
            modified_at: None,
            stages,
            stage_progress,
        };
        order.reprice(prosthetic);
        order
    }

    /// Recompute tooth count and total price against a catalog item
    pub fn reprice(&mut self, prosthetic: &Prosthetic) {
        self.teeth_count = count_teeth(&self.teeth_numbers);
        self.total_price = prosthetic.price * f64::from(self.teeth_count);
    }

    /// Merge patch fields (prices are not touched here, see [`Order::reprice`])
    pub fn merge(&mut self, patch: OrderPatch) {
        if let Some(doctor_id) = patch.doctor_id {
            self.doctor_id = doctor_id;
        }
        if let Some(patient_code) = patch.patient_code {
            self.patient_code = patient_code;
        }
        if let Some(prosthetic_id) = patch.prosthetic_id {
            self.prosthetic_id = prosthetic_id;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(teeth_numbers) = patch.teeth_numbers {
            self.teeth_numbers = teeth_numbers;
        }
        if let Some(material) = patch.material {
            self.material = material;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes).filter(|n| !n.is_empty());
        }
    }

    /// Change the lifecycle status
    ///
    /// Entering `completed` stamps the completion time (kept if the order was
    /// already completed); leaving `completed` clears it.
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        match status {
            OrderStatus::Completed => {
                if self.status != OrderStatus::Completed || self.completed_at.is_none() {
                    self.completed_at = Some(now);
                }
            }
            _ => self.completed_at = None,
        }
        self.status = status;
    }

    /// Check the invariants every stored order keeps
    ///
    /// One progress entry per stage, and a tooth count matching the list.
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.stage_progress.len() != self.stages.len() {
            return Err(format!(
                "order {} has {} stage(s) but {} progress entries",
                self.id,
                self.stages.len(),
                self.stage_progress.len()
            ));
        }
        let expected = count_teeth(&self.teeth_numbers);
        if self.teeth_count != expected {
            return Err(format!(
                "order {} has teethCount {} but '{}' lists {}",
                self.id, self.teeth_count, self.teeth_numbers, expected
            ));
        }
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Not completed and due on or before `today + window_days`
    pub fn is_urgent(&self, today: NaiveDate, window_days: i64) -> bool {
        if self.is_completed() {
            return false;
        }
        self.deadline <= today + Duration::days(window_days)
    }

    /// Not completed and the deadline has already passed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed() && self.deadline < today
    }

    /// Number of stages marked done
    pub fn stages_done(&self) -> usize {
        self.stage_progress
            .iter()
            .filter(|p| p.status == StageStatus::Done)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn crown() -> Prosthetic {
        Prosthetic {
            id: EntityId::new(EntityPrefix::Pros),
            name: "Korona porcelanowa".to_string(),
            gmlc_code: "GMLC-001".to_string(),
            min_days: 7,
            price: 450.0,
            stages: vec![
                "Odlew".to_string(),
                "Szlifowanie".to_string(),
                "Porcelana".to_string(),
                "Glazura".to_string(),
            ],
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, hour, 0, 0).unwrap()
    }

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    fn input(prosthetic: &Prosthetic, teeth: &str) -> OrderInput {
        OrderInput {
            doctor_id: EntityId::new(EntityPrefix::Doc),
            patient_code: "P-001".to_string(),
            prosthetic_id: prosthetic.id.clone(),
            deadline: NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
            teeth_numbers: teeth.to_string(),
            material: "Cyrkon".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_count_teeth() {
        assert_eq!(count_teeth("14, 15, 16"), 3);
        assert_eq!(count_teeth("11"), 1);
        assert_eq!(count_teeth(""), 1);
        assert_eq!(count_teeth(" , ,"), 1);
        assert_eq!(count_teeth("21,,22, "), 2);
    }

    #[test]
    fn test_new_order_prices_and_snapshots_stages() {
        let crown = crown();
        let order = Order::new(input(&crown, "14, 15, 16"), &crown, at(1, 9));

        assert!(order.id.to_string().starts_with("ORD-"));
        assert_eq!(order.teeth_count, 3);
        assert_eq!(order.total_price, 1350.0);
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.stages, crown.stages);
        assert_eq!(order.stage_progress.len(), 4);
        assert!(order.stage_progress.iter().all(|p| {
            p.status == StageStatus::NotStarted
                && p.started_at.is_none()
                && p.completed_at.is_none()
                && p.assignee.is_empty()
        }));
    }

    #[test]
    fn test_stage_start_is_stamped_once() {
        let mut stage = StageProgress::default();
        stage.apply("Anna".to_string(), StageStatus::InProgress, at(2, 8));
        stage.apply("Anna".to_string(), StageStatus::InProgress, at(2, 12));
        assert_eq!(stage.started_at, Some(at(2, 8)));
    }

    #[test]
    fn test_leaving_done_clears_completion() {
        let mut stage = StageProgress::default();
        stage.apply("Anna".to_string(), StageStatus::Done, at(3, 8));
        assert_eq!(stage.completed_at, Some(at(3, 8)));
        // Done straight from not-started never stamps a start
        assert_eq!(stage.started_at, None);

        stage.apply("Anna".to_string(), StageStatus::InProgress, at(3, 10));
        assert_eq!(stage.completed_at, None);
        assert_eq!(stage.started_at, Some(at(3, 10)));
    }

    #[test]
    fn test_status_completion_stamp() {
        let crown = crown();
        let mut order = Order::new(input(&crown, "11"), &crown, at(1, 9));

        order.set_status(OrderStatus::Completed, at(4, 9));
        assert_eq!(order.completed_at, Some(at(4, 9)));

        order.set_status(OrderStatus::Completed, at(5, 9));
        assert_eq!(order.completed_at, Some(at(4, 9)));

        order.set_status(OrderStatus::Corrections, at(6, 9));
        assert_eq!(order.completed_at, None);
    }

    #[test]
    fn test_urgency_window() {
        let crown = crown();
        let order = Order::new(input(&crown, "11"), &crown, at(1, 9));

        // Deadline 2025-05-20
        assert!(!order.is_urgent(day(16), 3));
        assert!(order.is_urgent(day(17), 3));
        assert!(order.is_urgent(day(25), 3));

        let mut done = order.clone();
        done.set_status(OrderStatus::Completed, at(18, 9));
        assert!(!done.is_urgent(day(19), 3));
    }

    #[test]
    fn test_overdue() {
        let crown = crown();
        let order = Order::new(input(&crown, "11"), &crown, at(1, 9));
        assert!(!order.is_overdue(day(20)));
        assert!(order.is_overdue(day(21)));
    }

    #[test]
    fn test_check_consistency() {
        let crown = crown();
        let order = Order::new(input(&crown, "11, 12"), &crown, at(1, 9));
        assert!(order.check_consistency().is_ok());

        let mut misaligned = order.clone();
        misaligned.stage_progress.clear();
        assert!(misaligned
            .check_consistency()
            .unwrap_err()
            .contains("progress"));

        let mut miscounted = order;
        miscounted.teeth_count = 7;
        assert!(miscounted
            .check_consistency()
            .unwrap_err()
            .contains("teethCount 7"));
    }

    #[test]
    fn test_status_rank_follows_lifecycle() {
        let mut statuses = vec![
            OrderStatus::Completed,
            OrderStatus::Corrections,
            OrderStatus::New,
            OrderStatus::ReadyForPickup,
            OrderStatus::InProgress,
            OrderStatus::TrialFitting,
        ];
        statuses.sort_by_key(|s| s.rank());
        assert_eq!(statuses, OrderStatus::all());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "ready-for-pickup".parse::<OrderStatus>().unwrap(),
            OrderStatus::ReadyForPickup
        );
        assert_eq!(
            "trial_fitting".parse::<OrderStatus>().unwrap(),
            OrderStatus::TrialFitting
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert_eq!("not-started".parse::<StageStatus>().unwrap(), StageStatus::NotStarted);
    }

    #[test]
    fn test_order_json_field_names() {
        let crown = crown();
        let order = Order::new(input(&crown, "14, 15"), &crown, at(1, 9));
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["teethCount"], 2);
        assert_eq!(json["status"], "new");
        assert_eq!(json["stageProgress"][0]["status"], "not-started");
        assert!(json["stageProgress"][0]["startedAt"].is_null());
    }
}
