use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeStatus {
    Paid,
    Pending,
    Partial,
}

impl FeeStatus {
    pub fn parse(s: &str) -> Option<FeeStatus> {
        match s {
            "Paid" => Some(FeeStatus::Paid),
            "Pending" => Some(FeeStatus::Pending),
            "Partial" => Some(FeeStatus::Partial),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Paid => "Paid",
            FeeStatus::Pending => "Pending",
            FeeStatus::Partial => "Partial",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportDetails {
    pub bus_route: String,
    pub bus_stop: String,
    pub pickup_time: String,
    pub drop_time: String,
    pub monthly_fee: String,
    pub bus_number: String,
    pub distance: String,
    pub bus_monitor: String,
    pub driver_name: String,
    pub driver_contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub roll_number: String,
    pub class: String,
    pub section: String,
    pub admission_number: String,
    pub parent_contact: String,
    pub fee_status: FeeStatus,
    pub attendance: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_details: Option<TransportDetails>,
    pub updated_at: String,
}

/// In-memory authoritative collection of student records.
/// Insertion order is the canonical order every listing starts from.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<StudentRecord>,
}

impl RecordStore {
    pub fn new() -> RecordStore {
        RecordStore {
            records: Vec::new(),
        }
    }

    pub fn all(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, id: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Next id: max numeric id + 1, as text. With deletion stubbed out this
    /// coincides with count + 1, and stays monotonic if deletion ever lands.
    pub fn next_id(&self) -> String {
        let max = self
            .records
            .iter()
            .filter_map(|r| r.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }

    /// Replace the record with a matching id, or append. The existing
    /// record's position in insertion order is preserved on replace.
    pub fn upsert(&mut self, mut record: StudentRecord) {
        record.updated_at = now_rfc3339();
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record,
            None => self.records.push(record),
        }
    }

    pub fn admission_number_taken(&self, admission_number: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.admission_number == admission_number)
    }

    /// Load the sample roster. Clears anything already present so tests and
    /// demos start from a known state.
    pub fn load_seed(&mut self) -> usize {
        self.records = seed_students();
        self.records.len()
    }
}

pub fn now_rfc3339() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn seed(
    id: &str,
    name: &str,
    roll: &str,
    class: &str,
    section: &str,
    admission: &str,
    contact: &str,
    fee: FeeStatus,
    attendance: i64,
) -> StudentRecord {
    StudentRecord {
        id: id.to_string(),
        name: name.to_string(),
        roll_number: roll.to_string(),
        class: class.to_string(),
        section: section.to_string(),
        admission_number: admission.to_string(),
        parent_contact: contact.to_string(),
        fee_status: fee,
        attendance,
        transport_details: None,
        updated_at: now_rfc3339(),
    }
}

pub fn seed_students() -> Vec<StudentRecord> {
    vec![
        seed(
            "1",
            "Aanya Sharma",
            "101",
            "5",
            "A",
            "AKS-2023-101",
            "+91 9876543210",
            FeeStatus::Paid,
            95,
        ),
        seed(
            "2",
            "Rahul Kumar",
            "102",
            "5",
            "A",
            "AKS-2023-102",
            "+91 9876543211",
            FeeStatus::Pending,
            82,
        ),
        seed(
            "3",
            "Priya Patel",
            "103",
            "5",
            "B",
            "AKS-2023-103",
            "+91 9876543212",
            FeeStatus::Partial,
            90,
        ),
        seed(
            "4",
            "Arjun Singh",
            "104",
            "5",
            "B",
            "AKS-2023-104",
            "+91 9876543213",
            FeeStatus::Paid,
            98,
        ),
        seed(
            "5",
            "Zara Khan",
            "105",
            "5",
            "C",
            "AKS-2023-105",
            "+91 9876543214",
            FeeStatus::Paid,
            92,
        ),
        seed(
            "6",
            "Vikram Mehta",
            "106",
            "4",
            "A",
            "AKS-2023-106",
            "+91 9876543215",
            FeeStatus::Pending,
            78,
        ),
        seed(
            "7",
            "Neha Verma",
            "107",
            "4",
            "A",
            "AKS-2023-107",
            "+91 9876543216",
            FeeStatus::Paid,
            88,
        ),
        seed(
            "8",
            "Ishaan Gupta",
            "108",
            "4",
            "B",
            "AKS-2023-108",
            "+91 9876543217",
            FeeStatus::Partial,
            85,
        ),
    ]
}
