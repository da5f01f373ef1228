use crate::error::PriceError;
use crate::index::PricelistIndex;
use crate::model::{MatchStatus, NormalizedKey, PriceFields, PricedRow, PricedTable, Table};
use crate::normalize::{normalize_config, normalize_model};
use crate::schema::PriceSchema;

/// Price every row of `table` against `index`.
///
/// The only failure is the whole-table precondition: the input model and
/// configuration columns must exist. Once that passes, every row gets a
/// status; dirty cells end up `NOT_FOUND` or `INCOMPLETE_PRICE`.
pub fn price_rows(
    table: &Table,
    index: &PricelistIndex,
    schema: &PriceSchema,
) -> Result<PricedTable, PriceError> {
    let model_idx = table.find_column(&schema.input.model);
    let config_idx = table.find_column(&schema.input.config);

    let (model_idx, config_idx) = match (model_idx, config_idx) {
        (Some(m), Some(c)) => (m, c),
        (m, c) => {
            let mut missing = Vec::new();
            if m.is_none() {
                missing.push(schema.input.model.clone());
            }
            if c.is_none() {
                missing.push(schema.input.config.clone());
            }
            return Err(PriceError::MissingColumns {
                missing,
                required: schema.input_required(),
            });
        }
    };

    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let key = NormalizedKey::new(
                normalize_model(table.cell(row, model_idx), schema.keys.device_codes),
                normalize_config(table.cell(row, config_idx), schema.keys.config_mode),
            );

            let (prices, status) = match index.get(&key) {
                None => (PriceFields::default(), MatchStatus::NotFound),
                Some(record) if record.is_complete() => (record.fields(), MatchStatus::Ok),
                Some(record) => (record.fields(), MatchStatus::IncompletePrice),
            };

            PricedRow {
                row_number: table.sheet_row(row),
                cells: cells.clone(),
                key,
                prices,
                status,
            }
        })
        .collect();

    Ok(PricedTable {
        columns: table.columns.clone(),
        output_columns: schema.output_columns(),
        layout: schema.layout(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_index;
    use crate::model::{Cell, ConfigKey};

    fn pricelist() -> Table {
        Table::from_rows(
            vec![
                "Model".into(),
                "Cooling Rows + Heating Row".into(),
                "Base Price".into(),
                "Row Price".into(),
            ],
            vec![
                vec!["ABC".into(), "2+1R".into(), Cell::Number(100.0), Cell::Number(50.0)],
                vec!["ABC".into(), "3+1R".into(), Cell::Number(120.0), Cell::Empty],
                vec!["XYZ 10".into(), "4".into(), Cell::Number(80.5), Cell::Number(19.5)],
            ],
        )
    }

    fn input(rows: Vec<Vec<Cell>>) -> Table {
        Table::from_rows(
            vec!["Item".into(), "Model".into(), "Cooling Rows + Heating Row".into()],
            rows,
        )
    }

    fn priced(rows: Vec<Vec<Cell>>) -> PricedTable {
        let schema = PriceSchema::fcu();
        let (index, _) = build_index(&pricelist(), &schema).unwrap();
        price_rows(&input(rows), &index, &schema).unwrap()
    }

    #[test]
    fn end_to_end_ok() {
        let out = priced(vec![vec!["1".into(), "abc-".into(), "2+1r".into()]]);
        let row = &out.rows[0];
        assert_eq!(row.status, MatchStatus::Ok);
        assert_eq!(row.prices, PriceFields { base: Some(100.0), row: Some(50.0), total: Some(150.0) });
        assert_eq!(row.key, NormalizedKey::new("ABC", ConfigKey::Text("2+1R".into())));
    }

    #[test]
    fn unknown_model_is_not_found() {
        let out = priced(vec![vec!["1".into(), "NOPE".into(), "2+1R".into()]]);
        assert_eq!(out.rows[0].status, MatchStatus::NotFound);
        assert_eq!(out.rows[0].prices, PriceFields::default());
    }

    #[test]
    fn missing_row_price_is_incomplete() {
        let out = priced(vec![vec!["1".into(), "ABC".into(), "3+1R".into()]]);
        let row = &out.rows[0];
        assert_eq!(row.status, MatchStatus::IncompletePrice);
        assert_eq!(row.prices, PriceFields { base: Some(120.0), row: None, total: None });
    }

    #[test]
    fn blank_and_odd_cells_never_fail() {
        let out = priced(vec![
            vec![Cell::Empty, Cell::Empty, Cell::Empty],
            vec![Cell::Bool(true), Cell::Number(f64::NAN), Cell::Number(4.0)],
            vec!["short row".into()],
            vec!["4".into(), "xyz-10".into(), Cell::Number(4.0)],
        ]);
        assert_eq!(out.len(), 4);
        assert_eq!(out.rows[0].status, MatchStatus::NotFound);
        assert_eq!(out.rows[1].status, MatchStatus::NotFound);
        assert_eq!(out.rows[2].status, MatchStatus::NotFound);
        assert_eq!(out.rows[3].status, MatchStatus::Ok);
        assert_eq!(out.rows[3].prices.total, Some(100.0));
    }

    #[test]
    fn total_is_sum_exactly_when_ok() {
        let out = priced(vec![
            vec!["1".into(), "ABC".into(), "2+1R".into()],
            vec!["2".into(), "ABC".into(), "3+1R".into()],
            vec!["3".into(), "QQQ".into(), "1".into()],
        ]);
        for row in &out.rows {
            let summed = match (row.prices.base, row.prices.row) {
                (Some(b), Some(r)) => Some(b + r),
                _ => None,
            };
            if row.status == MatchStatus::Ok {
                assert_eq!(row.prices.total, summed);
            } else {
                assert_eq!(row.prices.total, None);
            }
        }
    }

    #[test]
    fn missing_config_column_fails_before_any_row() {
        let schema = PriceSchema::fcu();
        let (index, _) = build_index(&pricelist(), &schema).unwrap();
        let table = Table::from_rows(vec!["model".into()], vec![vec!["ABC".into()]]);
        match price_rows(&table, &index, &schema) {
            Err(PriceError::MissingColumns { missing, required }) => {
                assert_eq!(missing, vec!["Cooling Rows + Heating Row"]);
                assert_eq!(required, vec!["Model", "Cooling Rows + Heating Row"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn input_columns_preserved_in_order() {
        let out = priced(vec![vec!["7".into(), "ABC".into(), "2+1R".into()]]);
        assert_eq!(out.columns, vec!["Item", "Model", "Cooling Rows + Heating Row"]);
        assert_eq!(out.rows[0].cells[0], Cell::Text("7".into()));
        assert_eq!(out.rows[0].row_number, 2);
    }

    #[test]
    fn row_numbers_follow_header_position() {
        let schema = PriceSchema::fcu();
        let (index, _) = build_index(&pricelist(), &schema).unwrap();
        let table = input(vec![
            vec!["1".into(), "ABC".into(), "2+1R".into()],
            vec!["2".into(), "QQQ".into(), "1".into()],
        ])
        .with_header_row(2);
        let out = price_rows(&table, &index, &schema).unwrap();
        assert_eq!(out.rows[0].row_number, 4);
        assert_eq!(out.rows[1].row_number, 5);
    }

    #[test]
    fn key_with_every_price_blank_is_incomplete() {
        let schema = PriceSchema::fcu();
        let list = Table::from_rows(
            vec![
                "Model".into(),
                "Cooling Rows + Heating Row".into(),
                "Base Price".into(),
                "Row Price".into(),
            ],
            vec![vec!["ABC".into(), "2+1R".into(), Cell::Empty, "n/a".into()]],
        );
        let (index, _) = build_index(&list, &schema).unwrap();
        let out = price_rows(&input(vec![vec!["1".into(), "abc".into(), "2+1r".into()]]), &index, &schema)
            .unwrap();
        assert_eq!(out.rows[0].status, MatchStatus::IncompletePrice);
        assert_eq!(out.rows[0].prices, PriceFields::default());
    }

    #[test]
    fn single_total_schema() {
        let schema = PriceSchema::fcu_device();
        let list = Table::from_rows(
            vec!["model".into(), "rows".into(), "price".into()],
            vec![
                vec!["EBH 050".into(), Cell::Number(2.0), Cell::Number(640.0)],
                vec!["EBH 080".into(), Cell::Number(2.0), Cell::Empty],
            ],
        );
        let (index, _) = build_index(&list, &schema).unwrap();
        let table = Table::from_rows(
            vec!["MODEL".into(), "Rows".into()],
            vec![
                vec!["ebh50".into(), "2.0".into()],
                vec!["EBH-80".into(), "2".into()],
                vec!["EBH 50".into(), "two".into()],
            ],
        );
        let out = price_rows(&table, &index, &schema).unwrap();
        assert_eq!(out.rows[0].status, MatchStatus::Ok);
        assert_eq!(out.rows[0].prices.total, Some(640.0));
        assert_eq!(out.rows[0].prices.base, None);
        assert_eq!(out.rows[1].status, MatchStatus::IncompletePrice);
        assert_eq!(out.rows[2].status, MatchStatus::NotFound);
        assert_eq!(out.output_columns, vec!["Total Price", "Match Status"]);
    }
}
