//! Read-only derivations over records and the roster.
//!
//! Grouping here is the single source of truth shared by list views and
//! the CSV export: identical inputs must produce identical groupings,
//! including order.

use serde::{Deserialize, Serialize};

use crate::Roster;

/// Personnel of one record, bucketed under one department label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentGroup {
    pub department: String,
    pub members: Vec<String>,
}

/// Groups names by current roster lookup.
///
/// Groups are ordered by roster insertion position (the default roster
/// puts 品質部 before 技術部), with the unassigned bucket after every
/// known department. Members keep their original input order. The result
/// is deterministic across repeated calls for the same input.
pub fn group_by_department(roster: &Roster, personnel: &[String]) -> Vec<DepartmentGroup> {
    let mut groups: Vec<DepartmentGroup> = Vec::new();
    for person in personnel {
        let department = roster.department_of(person);
        match groups.iter_mut().find(|g| g.department == department) {
            Some(group) => group.members.push(person.clone()),
            None => groups.push(DepartmentGroup {
                department: department.to_string(),
                members: vec![person.clone()],
            }),
        }
    }
    // Stable sort: equal priorities keep first-seen order.
    groups.sort_by_key(|g| roster.priority(&g.department));
    groups
}

/// Renders groups as `"Dept(a,b) Dept2(c)"`.
pub fn render_groups(groups: &[DepartmentGroup]) -> String {
    groups
        .iter()
        .map(|g| format!("{}({})", g.department, g.members.join(",")))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Department;

    fn two_dept_roster() -> Roster {
        Roster::new(vec![
            Department::new("品質部", ["A"]),
            Department::new("技術部", ["B"]),
        ])
        .unwrap()
    }

    #[test]
    fn groups_sort_by_roster_order() {
        let roster = two_dept_roster();
        let personnel = vec!["B".to_string(), "A".to_string()];

        let groups = group_by_department(&roster, &personnel);
        assert_eq!(render_groups(&groups), "品質部(A) 技術部(B)");
    }

    #[test]
    fn unassigned_sorts_last_and_members_keep_input_order() {
        let roster = two_dept_roster();
        let personnel = vec![
            "X".to_string(),
            "B".to_string(),
            "Y".to_string(),
            "A".to_string(),
        ];

        let groups = group_by_department(&roster, &personnel);
        assert_eq!(
            render_groups(&groups),
            "品質部(A) 技術部(B) 其他部門(X,Y)"
        );
    }

    #[test]
    fn grouping_is_deterministic() {
        let roster = Roster::default_roster();
        let personnel = vec![
            "Sam".to_string(),
            "清野".to_string(),
            "俊德".to_string(),
            "虹妙".to_string(),
        ];

        let first = group_by_department(&roster, &personnel);
        let second = group_by_department(&roster, &personnel);
        assert_eq!(first, second);
        assert_eq!(
            render_groups(&first),
            "品質部(俊德,虹妙) 技術部(清野) 其他部門(Sam)"
        );
    }
}
