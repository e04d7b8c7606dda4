//! Sorting behaviour of the sortable table.

use cadasil_table::{
    Column, SortState, SortableTable, TableView, compare_values, lookup, sort_rows,
};
use proptest::prelude::*;
use serde_json::{Value, json};

fn ids(rows: &[&Value]) -> Vec<i64> {
    rows.iter()
        .map(|row| lookup(*row, "id").as_i64().unwrap_or(-1))
        .collect()
}

#[test]
fn nulls_sort_last_ascending() {
    let rows = vec![
        json!({"id": 3, "age": null}),
        json!({"id": 1, "age": 40}),
        json!({"id": 2, "age": 20}),
    ];
    let ascending = sort_rows(&rows, &SortState::Ascending("age".to_string()));
    assert_eq!(ids(&ascending), [2, 1, 3]);
}

#[test]
fn nulls_sort_last_descending_and_missing_counts_as_null() {
    let rows = vec![
        json!({"id": 3, "age": null}),
        json!({"id": 4}),
        json!({"id": 1, "age": 40}),
        json!({"id": 2, "age": 20}),
    ];
    let descending = sort_rows(&rows, &SortState::Descending("age".to_string()));
    assert_eq!(ids(&descending), [1, 2, 3, 4]);
}

#[test]
fn nested_paths_sort_by_inner_value() {
    let rows = vec![
        json!({"id": 1, "scores": {"mmse": 28}}),
        json!({"id": 2, "scores": {"mmse": 16}}),
        json!({"id": 3, "scores": {}}),
    ];
    let ascending = sort_rows(&rows, &SortState::Ascending("scores.mmse".to_string()));
    assert_eq!(ids(&ascending), [2, 1, 3]);
}

#[test]
fn three_clicks_restore_original_order() {
    let rows = vec![
        json!({"id": 2, "provincia": "Salta"}),
        json!({"id": 1, "provincia": "Córdoba"}),
        json!({"id": 3, "provincia": "CABA"}),
    ];
    let columns = vec![
        Column::new("id", "ID"),
        Column::new("provincia", "Provincia"),
    ];
    let mut table = SortableTable::new(rows, columns).expect("table");
    let original: Vec<i64> = ids(&table.sorted_rows());

    table.click("provincia");
    assert_eq!(ids(&table.sorted_rows()), [3, 1, 2]);
    table.click("provincia");
    assert_eq!(ids(&table.sorted_rows()), [2, 1, 3]);
    table.click("provincia");
    assert_eq!(table.sort_state(), &SortState::Unsorted);
    assert_eq!(ids(&table.sorted_rows()), original);
}

#[test]
fn rendered_rows_follow_sort() {
    let rows = vec![json!({"record_id": 10, "edad": 61}), json!({"record_id": 11, "edad": 33})];
    let columns = vec![Column::new("record_id", "ID"), Column::new("edad", "Edad")];
    let table = SortableTable::new(rows, columns)
        .expect("table")
        .with_sort(SortState::Ascending("edad".to_string()));
    let TableView::Rows(rendered) = table.render() else {
        panic!("expected rows");
    };
    assert_eq!(rendered.row_keys(), ["row-11", "row-10"]);
    assert_eq!(rendered.column_text(1), ["33", "61"]);
}

fn arb_cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        (0_i64..20).prop_map(Value::from),
        (0_i64..20).prop_map(|n| Value::from(n.to_string())),
        prop::sample::select(vec!["Salta", "salta", "Córdoba", "CABA", "Río Negro", ""])
            .prop_map(Value::from),
        "[0-9]{1,2}[a-c]{0,2}".prop_map(Value::from),
    ]
}

#[test]
fn mixed_numbers_and_codes_group_together() {
    let rows: Vec<Value> = (0..60)
        .map(|index| {
            let value = match index % 3 {
                0 => json!(2),
                1 => json!("10"),
                _ => json!("1a"),
            };
            json!({"id": index, "value": value})
        })
        .collect();
    let sorted = sort_rows(&rows, &SortState::Ascending("value".to_string()));
    let values: Vec<&Value> = sorted.iter().map(|row| lookup(*row, "value")).collect();
    assert!(values[..20].iter().all(|value| **value == json!(2)));
    assert!(values[20..40].iter().all(|value| **value == json!("10")));
    assert!(values[40..].iter().all(|value| **value == json!("1a")));
}

fn arb_rows() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_cell(), 0..30).prop_map(|cells| {
        cells
            .into_iter()
            .enumerate()
            .map(|(index, value)| json!({"id": index, "value": value}))
            .collect()
    })
}

proptest! {
    #[test]
    fn sorting_twice_matches_sorting_once(rows in arb_rows()) {
        let state = SortState::Ascending("value".to_string());
        let once: Vec<Value> = sort_rows(&rows, &state).into_iter().cloned().collect();
        let twice = ids(&sort_rows(&once, &state));
        prop_assert_eq!(ids(&sort_rows(&rows, &state)), twice);
    }

    #[test]
    fn sort_is_stable_and_orders_values(rows in arb_rows(), descending in any::<bool>()) {
        let state = if descending {
            SortState::Descending("value".to_string())
        } else {
            SortState::Ascending("value".to_string())
        };
        let sorted = sort_rows(&rows, &state);
        for pair in sorted.windows(2) {
            let (left, right) = (lookup(pair[0], "value"), lookup(pair[1], "value"));
            let left_id = lookup(pair[0], "id").as_i64().unwrap_or_default();
            let right_id = lookup(pair[1], "id").as_i64().unwrap_or_default();
            match (left.is_null(), right.is_null()) {
                (false, true) => {}
                (true, false) => prop_assert!(false, "null sorted before a value"),
                (true, true) => prop_assert!(left_id < right_id),
                (false, false) => {
                    let ordering = compare_values(left, right);
                    let ordering = if descending { ordering.reverse() } else { ordering };
                    prop_assert!(ordering.is_le());
                    if ordering.is_eq() {
                        prop_assert!(left_id < right_id);
                    }
                }
            }
        }
    }

    #[test]
    fn comparison_is_transitive(a in arb_cell(), b in arb_cell(), c in arb_cell()) {
        prop_assume!(!a.is_null() && !b.is_null() && !c.is_null());
        if compare_values(&a, &b).is_le() && compare_values(&b, &c).is_le() {
            prop_assert!(compare_values(&a, &c).is_le());
        }
    }

    #[test]
    fn clicking_three_times_is_identity(rows in arb_rows()) {
        let columns = vec![Column::new("id", "ID"), Column::new("value", "Valor")];
        let mut table = SortableTable::new(rows.clone(), columns).expect("table");
        for _ in 0..3 {
            table.click("value");
        }
        prop_assert_eq!(table.sort_state(), &SortState::Unsorted);
        let expected: Vec<&Value> = rows.iter().collect();
        prop_assert_eq!(ids(&table.sorted_rows()), ids(&expected));
    }
}
