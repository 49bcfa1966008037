//! Tests for the employee store

use super::*;
use crate::core::criteria::{Attribute, Criterion, GroupKey, GroupSpec, Projection};
use crate::core::employee::{EmployeeDraft, Role, Salary};
use crate::core::error::CoreError;
use crate::core::identity::Ssn;
use tempfile::TempDir;

fn ssn(s: &str) -> Ssn {
    Ssn::parse(s).unwrap()
}

/// Empty schema with only the Research department
fn empty_store() -> (TempDir, EmployeeStore) {
    let tmp = TempDir::new().unwrap();
    let store = EmployeeStore::open(tmp.path().join("company.db"));
    store.install_schema().unwrap();
    store
        .session()
        .unwrap()
        .execute_batch("INSERT INTO DEPARTMENT (Dnumber, Dname) VALUES (5, 'Research');")
        .unwrap();
    (tmp, store)
}

/// Schema plus the sample COMPANY dataset
fn sample_store() -> (TempDir, EmployeeStore) {
    let tmp = TempDir::new().unwrap();
    let store = EmployeeStore::open(tmp.path().join("company.db"));
    store.install_schema().unwrap();
    store.load_sample_data().unwrap();
    (tmp, store)
}

fn draft(first: &str, last: &str, id: &str, sex: &str, salary: &str) -> EmployeeDraft {
    EmployeeDraft {
        first_name: first.into(),
        last_name: last.into(),
        ssn: id.into(),
        sex: sex.into(),
        salary: salary.into(),
        department_number: "5".into(),
        ..Default::default()
    }
}

fn salary_of(store: &EmployeeStore, id: &str) -> String {
    store.find(&ssn(id)).unwrap().unwrap().salary.to_string()
}

// =========================================================================
// Inserts and searches
// =========================================================================

#[test]
fn test_insert_then_search_by_department() {
    let (_tmp, store) = empty_store();
    let mut jane = draft("Jane", "Doe", "123456789", "F", "55000");
    jane.middle_initial = "Q".into();
    store.insert_draft(&jane).unwrap();

    let projection = Projection::new([Attribute::Name, Attribute::Salary]);
    let found = store
        .search(&[Criterion::departments(["Research"])], &projection)
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(projection.render(&found[0], 0), vec!["Jane Q. Doe", "55000.00"]);
}

#[test]
fn test_insert_round_trip() {
    let (_tmp, store) = empty_store();
    let mut d = draft("Ada", "Lovelace", "111222333", "f", "1234.5");
    d.middle_initial = "k".into();
    d.birth_date = "1815-12-10".into();
    d.address = "12 St James Sq, London".into();
    d.supervisor_ssn = "999999999".into();
    let inserted = store.insert_draft(&d).unwrap();

    let stored = store.find(&inserted.ssn).unwrap().unwrap();
    assert!(stored.same_record(&inserted));
    assert_eq!(stored.department_name.as_deref(), Some("Research"));
    assert_eq!(stored.salary.to_string(), "1234.50");
    assert!(stored.created.is_some());
    assert!(stored.modified.is_some());
}

#[test]
fn test_duplicate_ssn_is_rejected() {
    let (_tmp, store) = empty_store();
    let d = draft("Jane", "Doe", "123123123", "F", "1");
    store.insert_draft(&d).unwrap();

    let err = store.insert_draft(&d).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateKey { ref ssn } if ssn.as_str() == "123123123"));
}

#[test]
fn test_insert_requires_sex_and_department() {
    let (_tmp, store) = empty_store();
    let mut emp = draft("Jane", "Doe", "123123123", "F", "1").validate().unwrap();
    emp.sex = None;
    assert!(matches!(
        store.insert(&emp).unwrap_err(),
        CoreError::Validation { field: "sex", .. }
    ));

    let mut d = draft("Jane", "Doe", "123123123", "F", "1");
    d.department_number = String::new();
    assert!(store.insert_draft(&d).is_err());
    assert!(!store.employee_exists(&ssn("123123123")).unwrap());
}

#[test]
fn test_search_filters_combine() {
    let (_tmp, store) = sample_store();
    let projection = Projection::new([Attribute::Name]);

    let rich = store
        .search(&[Criterion::salary_at_least("40000")], &projection)
        .unwrap();
    let mut names: Vec<String> = rich.iter().map(|e| e.display_name()).collect();
    names.sort();
    assert_eq!(names, vec!["Franklin T. Wong", "James E. Borg", "Jennifer S. Wallace"]);

    let houston_women = store
        .search(
            &[
                Criterion::single(Attribute::Address, "Houston"),
                Criterion::sexes(["F"]),
            ],
            &projection,
        )
        .unwrap();
    assert_eq!(houston_women.len(), 1);
    assert_eq!(houston_women[0].display_name(), "Joyce A. English");

    let by_full_name = store.search(&[Criterion::name("T. Wong")], &projection).unwrap();
    assert_eq!(by_full_name.len(), 1);
    assert_eq!(by_full_name[0].ssn.as_str(), "333445555");
}

#[test]
fn test_blank_middle_initial_found_by_displayed_name() {
    let (_tmp, store) = sample_store();
    store
        .session()
        .unwrap()
        .execute("UPDATE EMPLOYEE SET Minit = '' WHERE Ssn = '888665555'", [])
        .unwrap();
    let projection = Projection::new([Attribute::Name]);

    let borg = store.find(&ssn("888665555")).unwrap().unwrap();
    assert_eq!(borg.display_name(), "James Borg");

    let found = store
        .search(&[Criterion::name(borg.display_name())], &projection)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].ssn.as_str(), "888665555");
    assert!(store
        .search(&[Criterion::name("James . Borg")], &projection)
        .unwrap()
        .is_empty());
}

#[test]
fn test_projection_leaves_other_fields_empty() {
    let (_tmp, store) = sample_store();
    let found = store
        .search(&[Criterion::ssn("123456789")], &Projection::new([Attribute::Salary]))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].salary.to_string(), "30000.00");
    assert!(found[0].first_name.is_empty());
    assert!(found[0].department_name.is_none());
}

#[test]
fn test_get_all_sorted_by_name() {
    let (_tmp, store) = sample_store();
    let first_names: Vec<String> = store
        .get_all()
        .unwrap()
        .into_iter()
        .map(|e| e.first_name)
        .collect();
    assert_eq!(
        first_names,
        vec!["Ahmad", "Alicia", "Franklin", "James", "Jennifer", "John", "Joyce", "Ramesh"]
    );
}

// =========================================================================
// Grouped averages
// =========================================================================

#[test]
fn test_group_average_by_sex() {
    let (_tmp, store) = empty_store();
    store.insert_draft(&draft("Al", "One", "100000001", "M", "50000")).unwrap();
    store.insert_draft(&draft("Bo", "Two", "100000002", "M", "70000")).unwrap();
    store.insert_draft(&draft("Cy", "Three", "100000003", "F", "60000")).unwrap();

    let averages = store.group_average(GroupSpec::Sex).unwrap();
    assert_eq!(averages.len(), 2);
    assert_eq!(averages[&GroupKey::from("M")], 60000.0);
    assert_eq!(averages[&GroupKey::from("F")], 60000.0);
}

#[test]
fn test_group_average_by_supervisor_keeps_missing() {
    let (_tmp, store) = sample_store();
    let averages = store.group_average(GroupSpec::Supervisor).unwrap();

    assert_eq!(averages[&GroupKey::from("333445555")], 31000.0);
    assert_eq!(averages[&GroupKey::from("987654321")], 25000.0);
    assert_eq!(averages[&GroupKey::from("888665555")], 41500.0);
    assert_eq!(averages[&GroupKey::Missing], 55000.0);
    assert_eq!(
        GroupKey::Missing.label(&GroupSpec::Supervisor),
        "No Supervisor"
    );
}

#[test]
fn test_blank_supervisor_joins_missing_group() {
    let (_tmp, store) = sample_store();
    store
        .session()
        .unwrap()
        .execute("UPDATE EMPLOYEE SET Super_ssn = ' ' WHERE Ssn = '333445555'", [])
        .unwrap();

    let averages = store.group_average(GroupSpec::Supervisor).unwrap();
    assert_eq!(averages[&GroupKey::Missing], 47500.0);
    assert_eq!(averages[&GroupKey::from("888665555")], 43000.0);
    assert_eq!(averages.len(), 4);
}

#[test]
fn test_group_average_by_department() {
    let (_tmp, store) = sample_store();
    let averages = store.group_average(GroupSpec::Department).unwrap();
    assert_eq!(averages[&GroupKey::from("Research")], 33250.0);
    assert_eq!(averages[&GroupKey::from("Administration")], 31000.0);
    assert_eq!(averages[&GroupKey::from("Headquarters")], 55000.0);
    assert!(!averages.contains_key(&GroupKey::Missing));
}

// =========================================================================
// Updates
// =========================================================================

#[test]
fn test_update_bad_value_skips_row() {
    let (_tmp, store) = sample_store();
    let outcome = store
        .update(&[ssn("123456789")], EditableAttribute::Salary, "not-a-number")
        .unwrap();

    assert_eq!(outcome.succeeded, 0);
    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(
        outcome.failures[0].error,
        CoreError::Validation { field: "salary", .. }
    ));
    assert_eq!(salary_of(&store, "123456789"), "30000.00");
}

#[test]
fn test_update_many_rows() {
    let (_tmp, store) = sample_store();
    let ids = [ssn("123456789"), ssn("666884444"), ssn("000000000")];
    let outcome = store
        .update(&ids, EditableAttribute::Salary, "45000.25")
        .unwrap();

    assert_eq!(outcome.requested, 3);
    assert_eq!(outcome.succeeded, 2);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.missing(), 1);
    assert_eq!(salary_of(&store, "123456789"), "45000.25");
    assert_eq!(salary_of(&store, "666884444"), "45000.25");
    assert_eq!(salary_of(&store, "453453453"), "25000.00");
}

#[test]
fn test_update_department_and_supervisor() {
    let (_tmp, store) = sample_store();
    store
        .update(&[ssn("123456789")], EditableAttribute::Department, "4")
        .unwrap();
    store
        .update(&[ssn("123456789")], EditableAttribute::Supervisor, "987654321")
        .unwrap();

    let smith = store.find(&ssn("123456789")).unwrap().unwrap();
    assert_eq!(smith.department_number, Some(4));
    assert_eq!(smith.department_name.as_deref(), Some("Administration"));
    assert_eq!(smith.supervisor_ssn, Some(ssn("987654321")));
}

#[test]
fn test_update_rejects_self_supervision_per_row() {
    let (_tmp, store) = sample_store();
    let outcome = store
        .update(
            &[ssn("123456789"), ssn("666884444")],
            EditableAttribute::Supervisor,
            "123456789",
        )
        .unwrap();

    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].ssn, ssn("123456789"));
    let narayan = store.find(&ssn("666884444")).unwrap().unwrap();
    assert_eq!(narayan.supervisor_ssn, Some(ssn("123456789")));
}

#[test]
fn test_update_refreshes_modified() {
    let (_tmp, store) = sample_store();
    store
        .session()
        .unwrap()
        .execute_batch("UPDATE EMPLOYEE SET modified = '2000-01-01 00:00:00';")
        .unwrap();
    let stale = store.find(&ssn("999887777")).unwrap().unwrap().modified.unwrap();

    store
        .update(&[ssn("999887777")], EditableAttribute::Address, "1 New Rd, Spring TX")
        .unwrap();

    let fresh = store.find(&ssn("999887777")).unwrap().unwrap();
    assert_eq!(fresh.address, "1 New Rd, Spring TX");
    assert!(fresh.modified.unwrap() > stale);
    let untouched = store.find(&ssn("987987987")).unwrap().unwrap();
    assert_eq!(untouched.modified, Some(stale));
}

// =========================================================================
// Deletes and the mutation guard
// =========================================================================

#[test]
fn test_blocked_supervisor_is_not_deleted() {
    let (_tmp, store) = empty_store();
    store.insert_draft(&draft("Sue", "Boss", "999999999", "F", "90000")).unwrap();
    let mut report = draft("Sam", "Report", "111111111", "M", "40000");
    report.supervisor_ssn = "999999999".into();
    store.insert_draft(&report).unwrap();

    let review = store.classify_deletion(&[ssn("999999999")]).unwrap();
    assert_eq!(review.blocked, vec![ssn("999999999")]);
    assert!(!review.is_clean());

    let err = store
        .delete_guarded(&[ssn("111111111"), ssn("999999999")], |_| true)
        .unwrap_err();
    match err {
        CoreError::DependencyBlocked { blocked } => assert_eq!(blocked, vec![ssn("999999999")]),
        other => panic!("expected DependencyBlocked, got {other:?}"),
    }
    assert!(store.employee_exists(&ssn("999999999")).unwrap());
    assert!(store.employee_exists(&ssn("111111111")).unwrap());
}

#[test]
fn test_warnable_delete_needs_confirmation() {
    let (_tmp, store) = sample_store();
    let smith = [ssn("123456789")];

    let review = store.classify_deletion(&smith).unwrap();
    assert!(review.blocked.is_empty());
    assert!(review.warnable);
    assert_eq!(review.details[0].project_assignments, 2);
    assert_eq!(review.details[0].dependents, 3);

    let declined = store.delete_guarded(&smith, |_| false).unwrap();
    assert!(matches!(declined, GuardedDelete::Declined));
    assert!(store.employee_exists(&smith[0]).unwrap());

    let deleted = store.delete_guarded(&smith, |_| true).unwrap();
    match deleted {
        GuardedDelete::Deleted(outcome) => assert_eq!(outcome.succeeded, 1),
        GuardedDelete::Declined => panic!("confirmed delete was declined"),
    }
    assert!(!store.employee_exists(&smith[0]).unwrap());
}

#[test]
fn test_clean_delete_skips_confirmation() {
    let (_tmp, store) = empty_store();
    store.insert_draft(&draft("Tim", "Temp", "555000111", "M", "1")).unwrap();

    let mut asked = false;
    let result = store
        .delete_guarded(&[ssn("555000111")], |_| {
            asked = true;
            false
        })
        .unwrap();
    assert!(matches!(result, GuardedDelete::Deleted(_)));
    assert!(!asked);
}

#[test]
fn test_self_supervision_does_not_block() {
    let (_tmp, store) = empty_store();
    store.insert_draft(&draft("Ola", "Solo", "444555666", "F", "1")).unwrap();
    store
        .session()
        .unwrap()
        .execute_batch("UPDATE EMPLOYEE SET Super_ssn = Ssn WHERE Ssn = '444555666';")
        .unwrap();

    let review = store.classify_deletion(&[ssn("444555666")]).unwrap();
    assert!(review.is_clean());
}

#[test]
fn test_delete_is_idempotent() {
    let (_tmp, store) = sample_store();
    let ids = [ssn("453453453")];
    assert_eq!(store.delete(&ids).unwrap().succeeded, 1);

    let again = store.delete(&ids).unwrap();
    assert_eq!(again.succeeded, 0);
    assert_eq!(again.missing(), 1);
}

#[test]
fn test_store_failure_interrupts_batch() {
    let (_tmp, store) = empty_store();
    for (first, id) in [("Ann", "111111111"), ("Ben", "222222222"), ("Cal", "333333333")] {
        store.insert_draft(&draft(first, "Test", id, "F", "1")).unwrap();
    }
    store
        .session()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER lock_ben BEFORE DELETE ON EMPLOYEE WHEN OLD.Ssn = '222222222' \
             BEGIN SELECT RAISE(ABORT, 'locked'); END;",
        )
        .unwrap();

    let err = store
        .delete(&[ssn("111111111"), ssn("222222222"), ssn("333333333")])
        .unwrap_err();
    match err {
        CoreError::BatchInterrupted {
            succeeded,
            attempted,
            source,
        } => {
            assert_eq!(succeeded, 1);
            assert_eq!(attempted, 2);
            assert!(matches!(*source, CoreError::DataAccess(_)));
        }
        other => panic!("expected BatchInterrupted, got {other:?}"),
    }
    assert!(!store.employee_exists(&ssn("111111111")).unwrap());
    assert!(store.employee_exists(&ssn("222222222")).unwrap());
    assert!(store.employee_exists(&ssn("333333333")).unwrap());
}

// =========================================================================
// Lookups and access
// =========================================================================

#[test]
fn test_login_roles() {
    let (_tmp, store) = sample_store();
    assert_eq!(store.login(&ssn("888665555")).unwrap(), Some(Role::Admin));
    assert_eq!(store.login(&ssn("123456789")).unwrap(), Some(Role::Employee));
    assert_eq!(store.login(&ssn("000000001")).unwrap(), None);

    assert!(store.add_admin(&ssn("123456789")).unwrap());
    assert!(!store.add_admin(&ssn("123456789")).unwrap());
    assert_eq!(store.login(&ssn("123456789")).unwrap(), Some(Role::Admin));
}

#[test]
fn test_departments_in_number_order() {
    let (_tmp, store) = sample_store();
    let departments = store.departments().unwrap();
    let numbers: Vec<i32> = departments.iter().map(|d| d.number).collect();
    assert_eq!(numbers, vec![1, 4, 5]);
    assert_eq!(departments[2].name, "Research");
    assert_eq!(departments[2].manager_ssn, Some(ssn("333445555")));
}

#[test]
fn test_install_is_repeatable() {
    let (_tmp, store) = sample_store();
    store.install_schema().unwrap();
    store.load_sample_data().unwrap();
    assert_eq!(store.get_all().unwrap().len(), 8);
    assert_eq!(
        store.find(&ssn("888665555")).unwrap().unwrap().salary,
        Salary::from_cents(5_500_000).unwrap()
    );
}
