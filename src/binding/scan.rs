//! Scanning one raw row into record instances.
use crate::binding::node::HeaderNode;
use crate::binding::path::MatchMode;
use crate::binding::record::RecordHandle;
use crate::binding::BindingError;
use crate::binding::ScanSettings;
use crate::helpers::recover::recover;
use crate::options::UnmatchedFields;
use log::warn;

impl HeaderNode {
    /// Scans `row` into `records`, binding each field by its full header path.
    ///
    /// Fields are filled in record order, then field declaration order. On the
    /// first failing cell the scan stops and the error carries the cell's 1-based
    /// column; fields assigned before it keep their new values.
    pub fn scan<S: AsRef<str>>(
        &self,
        row: &[S],
        records: &mut [&mut dyn RecordHandle],
    ) -> Result<(), BindingError> {
        recover("scan", || {
            scan_row(self.leaves(), self.settings(), row, records, MatchMode::Exact)
        })
    }

    /// Like [`HeaderNode::scan`], but a field binds to the first leaf whose path
    /// ends with the field's binding path.
    pub fn scan_relative<S: AsRef<str>>(
        &self,
        row: &[S],
        records: &mut [&mut dyn RecordHandle],
    ) -> Result<(), BindingError> {
        recover("scan_relative", || {
            scan_row(self.leaves(), self.settings(), row, records, MatchMode::Relative)
        })
    }
}

/// Resizes a row to `width` cells: surplus cells are dropped from the front,
/// missing cells are padded with empty strings at the back.
pub(crate) fn fit_row<S: AsRef<str>>(row: &[S], width: usize) -> Vec<&str> {
    let skip = row.len().saturating_sub(width);
    let mut cells: Vec<&str> = row[skip..].iter().map(|cell| cell.as_ref()).collect();
    cells.resize(width, "");
    cells
}

fn scan_row<S: AsRef<str>>(
    leaves: &[HeaderNode],
    settings: ScanSettings,
    row: &[S],
    records: &mut [&mut dyn RecordHandle],
    mode: MatchMode,
) -> Result<(), BindingError> {
    let cells = fit_row(row, leaves.len());
    for record in records.iter_mut() {
        scan_record(leaves, settings, &cells, &mut **record, mode)?;
    }
    Ok(())
}

pub(crate) fn scan_record(
    leaves: &[HeaderNode],
    settings: ScanSettings,
    cells: &[&str],
    record: &mut dyn RecordHandle,
    mode: MatchMode,
) -> Result<(), BindingError> {
    for index in 0..record.field_count() {
        let position = {
            let path = record.field_path(index);
            leaves.iter().position(|leaf| path.matches(leaf.path(), mode))
        };
        let Some(position) = position else {
            if settings.unmatched_fields == UnmatchedFields::Strict {
                return Err(BindingError::UnboundField {
                    field: record.field_name(index),
                    path: record.field_path(index).to_string(),
                });
            }
            continue;
        };

        let leaf = &leaves[position];
        let (column, _) = leaf.col_index_pos();
        if let Err(source) = record.assign(index, cells[position], column) {
            return Err(if settings.human_error_message {
                warn!("Scan row {:?} failed at column {}: {:#}", cells, column, source);
                BindingError::InvalidCell {
                    column,
                    path: leaf.path().join("-"),
                }
            } else {
                BindingError::CellConversion {
                    column,
                    path: leaf.path().join("|"),
                    source,
                }
            });
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::binding::record::Record;
    use crate::binding::record::Schema;
    use crate::spreadsheet::span::HeaderSpan;
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use std::sync::OnceLock;

    /// |    Order    |      Sales       |
    /// | Id | Buyer  | Region  | Total  |
    pub(crate) fn order_tree(settings: ScanSettings) -> HeaderNode {
        HeaderNode::root("Orders", 1, 4, settings)
            .build(&[
                HeaderSpan::new("A1:B1", "Order"),
                HeaderSpan::new("C1:D1", "Sales"),
                HeaderSpan::new("A2", "Id"),
                HeaderSpan::new("B2", "Buyer"),
                HeaderSpan::new("C2", "Region"),
                HeaderSpan::new("D2", "Total"),
            ])
            .unwrap()
    }

    #[derive(Default, Debug, Clone, PartialEq)]
    pub(crate) struct Order {
        pub(crate) id: u32,
        pub(crate) buyer: String,
    }

    impl Record for Order {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Order>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::<Order>::builder()
                    .field("id", "Order|Id", |order: &mut Order, id: u32| order.id = id)
                    .field("buyer", "Order|Buyer", |order: &mut Order, buyer: String| order.buyer = buyer)
                    .build()
            })
        }
    }

    #[derive(Default, Debug, Clone, PartialEq)]
    pub(crate) struct Sales {
        pub(crate) region: String,
        pub(crate) total: f64,
    }

    impl Record for Sales {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Sales>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::<Sales>::builder()
                    .field("region", "Sales|Region", |sales: &mut Sales, region: String| sales.region = region)
                    .field("total", "Sales|Total", |sales: &mut Sales, total: f64| sales.total = total)
                    .build()
            })
        }
    }

    /// Binds by suffix only, for relative scans.
    #[derive(Default, Debug, PartialEq)]
    struct ShortSales {
        region: String,
        total: f64,
    }

    impl Record for ShortSales {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<ShortSales>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::<ShortSales>::builder()
                    .field("region", "Region", |sales: &mut ShortSales, region: String| sales.region = region)
                    .field("total", "Total", |sales: &mut ShortSales, total: f64| sales.total = total)
                    .build()
            })
        }
    }

    #[derive(Default, Debug, PartialEq)]
    struct Misspelled {
        total: f64,
    }

    impl Record for Misspelled {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Misspelled>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::<Misspelled>::builder()
                    .field("total", "Sales|Totl", |record: &mut Misspelled, total: f64| record.total = total)
                    .build()
            })
        }
    }

    #[derive(Default, Debug)]
    struct Exploding {
        id: u32,
    }

    impl Record for Exploding {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Exploding>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::<Exploding>::builder()
                    .field_with(
                        "id",
                        "Order|Id",
                        |_: &str, _: usize| -> anyhow::Result<u32> { panic!("translator exploded") },
                        |record: &mut Exploding, id: u32| record.id = id,
                    )
                    .build()
            })
        }
    }

    #[derive(Default, Debug, PartialEq)]
    struct Upper {
        buyer: String,
    }

    impl Record for Upper {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Upper>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::<Upper>::builder()
                    .field_with(
                        "buyer",
                        "Order|Buyer",
                        |cell: &str, column: usize| {
                            if cell.chars().all(|c| !c.is_lowercase()) {
                                Ok(cell.to_owned())
                            } else {
                                Err(anyhow!("lowercase text in column {column}"))
                            }
                        },
                        |record: &mut Upper, buyer: String| record.buyer = buyer,
                    )
                    .build()
            })
        }
    }

    #[test]
    fn fit_row_resizes() {
        assert_eq!(fit_row(&["a", "b", "c", "d", "e"], 3), vec!["c", "d", "e"]);
        assert_eq!(fit_row(&["a", "b"], 3), vec!["a", "b", ""]);
        assert_eq!(fit_row(&["a", "b", "c"], 3), vec!["a", "b", "c"]);
        assert!(fit_row(&["a"], 0).is_empty());
    }

    #[test]
    fn scan_fills_several_records() {
        let tree = order_tree(ScanSettings::default());
        let mut order = Order::default();
        let mut sales = Sales::default();
        tree.scan(&["7", "Ada", "North", "12.5"], &mut [&mut order, &mut sales])
            .unwrap();
        assert_eq!(
            order,
            Order {
                id: 7,
                buyer: "Ada".to_owned(),
            }
        );
        assert_eq!(
            sales,
            Sales {
                region: "North".to_owned(),
                total: 12.5,
            }
        );
    }

    #[test]
    fn scan_drops_leading_and_pads_trailing_cells() {
        let tree = order_tree(ScanSettings::default());
        let mut order = Order::default();
        let mut sales = Sales::default();
        tree.scan(&["row-1", "7", "Ada", "North", "3"], &mut [&mut order, &mut sales])
            .unwrap();
        assert_eq!(order.id, 7);
        assert_eq!(sales.total, 3.0);

        let mut order = Order::default();
        tree.scan(&["8"], &mut [&mut order]).unwrap();
        assert_eq!(
            order,
            Order {
                id: 8,
                buyer: String::new(),
            }
        );
    }

    #[test]
    fn scan_is_idempotent() {
        let tree = order_tree(ScanSettings::default());
        let row = ["7", "Ada", "North", "12.5"];
        let mut first = Sales::default();
        let mut second = Sales::default();
        tree.scan(&row, &mut [&mut first]).unwrap();
        tree.scan(&row, &mut [&mut second]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn scan_reports_failing_column() {
        let tree = order_tree(ScanSettings::default());
        let mut order = Order::default();
        let mut sales = Sales::default();
        let error = tree
            .scan(&["7", "Ada", "North", "lots"], &mut [&mut order, &mut sales])
            .unwrap_err();
        assert_eq!(error.column(), Some(4));
        assert!(matches!(error, BindingError::CellConversion { ref path, .. } if path == "Sales|Total"));
        assert!(error.to_string().contains("parse 'lots' to f64 failed"));

        // Earlier fields keep their values
        assert_eq!(order.id, 7);
        assert_eq!(sales.region, "North");
        assert_eq!(sales.total, 0.0);
    }

    #[test]
    fn scan_with_human_error_message() {
        let tree = order_tree(ScanSettings {
            human_error_message: true,
            ..Default::default()
        });
        let mut order = Order::default();
        let error = tree.scan(&["seven", "Ada", "", ""], &mut [&mut order]).unwrap_err();
        assert_eq!(error.column(), Some(1));
        assert_eq!(error.to_string(), "Order-Id cell is invalid, please correct it");
    }

    #[test]
    fn scan_with_custom_translator() {
        let tree = order_tree(ScanSettings::default());
        let mut upper = Upper::default();
        tree.scan(&["1", "ADA", "", ""], &mut [&mut upper]).unwrap();
        assert_eq!(upper.buyer, "ADA");

        let error = tree.scan(&["1", "Ada", "", ""], &mut [&mut upper]).unwrap_err();
        assert_eq!(error.column(), Some(2));
        assert!(error.to_string().contains("lowercase text in column 2"));
    }

    #[test]
    fn scan_recovers_from_panics() {
        let tree = order_tree(ScanSettings::default());
        let mut record = Exploding::default();
        let error = tree.scan(&["1", "", "", ""], &mut [&mut record]).unwrap_err();
        assert!(matches!(
            error,
            BindingError::InternalFault { operation: "scan", ref message } if message == "translator exploded"
        ));
        assert_eq!(error.column(), None);
    }

    #[test]
    fn scan_relative_binds_by_suffix() {
        let tree = order_tree(ScanSettings::default());
        let row = ["7", "Ada", "South", "4.25"];

        let mut short = ShortSales::default();
        tree.scan(&row, &mut [&mut short]).unwrap();
        assert_eq!(short, ShortSales::default());

        tree.scan_relative(&row, &mut [&mut short]).unwrap();
        assert_eq!(
            short,
            ShortSales {
                region: "South".to_owned(),
                total: 4.25,
            }
        );

        let mut sales = Sales::default();
        tree.scan_relative(&row, &mut [&mut sales]).unwrap();
        assert_eq!(sales.total, 4.25);
    }

    #[test]
    fn unmatched_fields_lenient_and_strict() {
        let row = ["7", "Ada", "South", "4.25"];
        let mut record = Misspelled::default();
        order_tree(ScanSettings::default())
            .scan(&row, &mut [&mut record])
            .unwrap();
        assert_eq!(record.total, 0.0);

        let strict = order_tree(ScanSettings {
            unmatched_fields: UnmatchedFields::Strict,
            ..Default::default()
        });
        let error = strict.scan(&row, &mut [&mut record]).unwrap_err();
        assert!(matches!(
            error,
            BindingError::UnboundField { field: "total", ref path } if path == "Sales|Totl"
        ));
    }

    #[derive(Default, Debug)]
    struct Shipment {
        shipped: Option<NaiveDate>,
    }

    impl Record for Shipment {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Shipment>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::<Shipment>::builder()
                    .field("shipped", "When", |record: &mut Shipment, shipped: Option<NaiveDate>| {
                        record.shipped = shipped
                    })
                    .build()
            })
        }
    }

    #[test]
    fn scan_reports_out_of_range_serial_as_conversion_error() {
        let tree = HeaderNode::root("Shipments", 1, 1, ScanSettings::default())
            .build(&[HeaderSpan::new("A1", "When")])
            .unwrap();
        let mut shipment = Shipment::default();
        let error = tree.scan(&["1e300"], &mut [&mut shipment]).unwrap_err();
        assert!(matches!(error, BindingError::CellConversion { column: 1, ref path, .. } if path == "When"));
        assert_eq!(error.column(), Some(1));
        assert!(shipment.shipped.is_none());

        tree.scan(&["45352"], &mut [&mut shipment]).unwrap();
        assert_eq!(shipment.shipped, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn scan_against_empty_tree_is_noop() {
        let tree = HeaderNode::root("Empty", 1, 1, ScanSettings::default())
            .build(&[])
            .unwrap();
        let mut order = Order::default();
        tree.scan(&["1", "2"], &mut [&mut order]).unwrap();
        assert_eq!(order, Order::default());
    }

    #[test]
    fn scan_on_sub_node() {
        let tree = order_tree(ScanSettings::default());
        let sales_node = tree.sub_node("Sales").unwrap();
        let mut sales = Sales::default();
        sales_node.scan(&["East", "9"], &mut [&mut sales]).unwrap();
        assert_eq!(
            sales,
            Sales {
                region: "East".to_owned(),
                total: 9.0,
            }
        );
    }
}
