//! Roster primitives.
//!
//! The roster is the department → personnel configuration map. It is a
//! singleton document stored in the `settings` table, and the only
//! configuration data the engine owns. Department insertion order is
//! preserved: it drives both person lookup (first department listing the
//! name wins) and the grouping priority used by reports and exports.

use std::collections::HashMap;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Settings key under which the roster document is stored.
pub(crate) const ROSTER_KEY: &str = "departments";

/// Fallback department label for people no department lists.
///
/// Not an error condition, just a classification default. The default
/// roster also contains a real department with this name, so unassigned
/// people merge into that bucket when it exists.
pub const UNASSIGNED_DEPARTMENT: &str = "其他部門";

/// A named department and its members.
///
/// Member order is the order they were entered; duplicates within one
/// department are dropped on construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
    pub members: Vec<String>,
}

impl Department {
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut seen: Vec<String> = Vec::new();
        for member in members {
            let member = member.into();
            if !seen.contains(&member) {
                seen.push(member);
            }
        }
        Self {
            name: name.into(),
            members: seen,
        }
    }
}

/// Ordered department → personnel mapping with a derived reverse index
/// (person name → department position) for O(1) lookup.
///
/// A person may appear in more than one department; lookup resolves to
/// the first department in insertion order. Well-formed data has each
/// person in at most one department, but the roster does not enforce it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<Department>", into = "Vec<Department>")]
pub struct Roster {
    departments: Vec<Department>,
    index: HashMap<String, usize>,
}

impl Roster {
    /// Builds a roster from departments in insertion order.
    ///
    /// Rejects duplicate department names: the storage document is a map
    /// and cannot hold two identically named departments.
    pub fn new(departments: Vec<Department>) -> ResultEngine<Self> {
        let mut index = HashMap::new();
        for (position, department) in departments.iter().enumerate() {
            if departments[..position]
                .iter()
                .any(|d| d.name == department.name)
            {
                return Err(EngineError::ExistingKey(department.name.clone()));
            }
            for member in &department.members {
                // First department listing the person wins.
                index.entry(member.clone()).or_insert(position);
            }
        }
        Ok(Self { departments, index })
    }

    /// The baked-in roster used until one is saved, and whenever the
    /// stored one cannot be read.
    pub fn default_roster() -> Self {
        let departments = vec![
            Department::new("品質部", ["俊德", "虹妙"]),
            Department::new("技術部", ["清野", "宏澤"]),
            Department::new(UNASSIGNED_DEPARTMENT, ["Sam", "業務"]),
        ];
        // Names above are unique, construction cannot fail.
        Self::new(departments).unwrap_or(Self {
            departments: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// Department label for a person, falling back to the unassigned
    /// sentinel.
    pub fn department_of(&self, person: &str) -> &str {
        match self.index.get(person) {
            Some(position) => &self.departments[*position].name,
            None => UNASSIGNED_DEPARTMENT,
        }
    }

    /// Grouping priority of a department label: its insertion position,
    /// with unknown departments (including the sentinel when no real
    /// department carries that name) sorted after every known one.
    pub fn priority(&self, department: &str) -> usize {
        self.departments
            .iter()
            .position(|d| d.name == department)
            .unwrap_or(usize::MAX)
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    /// Department snapshot for a set of personnel, first-seen order,
    /// de-duplicated. Stored on each expense record at creation time.
    pub fn departments_for(&self, personnel: &[String]) -> Vec<String> {
        let mut snapshot: Vec<String> = Vec::new();
        for person in personnel {
            let department = self.department_of(person).to_string();
            if !snapshot.contains(&department) {
                snapshot.push(department);
            }
        }
        snapshot
    }
}

impl TryFrom<Vec<Department>> for Roster {
    type Error = EngineError;

    fn try_from(departments: Vec<Department>) -> Result<Self, Self::Error> {
        Self::new(departments)
    }
}

impl From<Roster> for Vec<Department> {
    fn from(roster: Roster) -> Self {
        roster.departments
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
