use std::{io::Write, time::Duration};

use api_types::{
    ListParams, Record, TimeRange,
    card_dispute::{CardDispute, CardDisputeList, CardDisputeStatus},
    check_transfer::{CheckTransfer, CheckTransferList, CheckTransferStatus},
    transaction::{Transaction, TransactionList, TransactionSourceCategory},
};
use bank_client::{ApiError, Client, Lister, Pager};
use serde_json::json;

use crate::{
    config::{AppConfig, CardDisputesArgs, CheckTransfersArgs, Command, Paging, TransactionsArgs},
    error::{AppError, Result},
};

pub fn client(settings: &AppConfig) -> Result<Client> {
    if settings.api_key.trim().is_empty() {
        return Err(AppError::Usage(
            "no API key configured: set BANK_API_KEY or `api_key` in the config file".to_string(),
        ));
    }

    let mut builder = Client::builder()
        .api_key(&settings.api_key)
        .environment(settings.environment)
        .timeout(Duration::from_secs(settings.timeout_secs));
    if let Some(base_url) = &settings.base_url {
        builder = builder.base_url(base_url);
    }
    Ok(builder.build()?)
}

pub async fn run(
    client: &Client,
    settings: &AppConfig,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Transactions(args) => {
            let params = transaction_params(&args, settings.page_size);
            let pager = Pager::<_, _, Transaction>::new(client, params);
            drain(pager, &args.paging, out).await
        }
        Command::CardDisputes(args) => {
            let params = card_dispute_params(&args, settings.page_size);
            let pager = Pager::<_, _, CardDispute>::new(client, params);
            drain(pager, &args.paging, out).await
        }
        Command::CheckTransfers(args) => {
            let params = check_transfer_params(&args, settings.page_size);
            let pager = Pager::<_, _, CheckTransfer>::new(client, params);
            drain(pager, &args.paging, out).await
        }
    }
}

fn transaction_params(args: &TransactionsArgs, page_size: u32) -> TransactionList {
    TransactionList {
        cursor: None,
        limit: Some(args.paging.limit.unwrap_or(page_size)),
        account_id: args.account_id.clone(),
        route_id: args.route_id.clone(),
        created_at: TimeRange {
            after: args.created_after,
            before: args.created_before,
            ..TimeRange::default()
        },
        category_in: args
            .categories
            .iter()
            .map(|category| TransactionSourceCategory::from(category.as_str()))
            .collect(),
    }
}

fn card_dispute_params(args: &CardDisputesArgs, page_size: u32) -> CardDisputeList {
    CardDisputeList {
        limit: Some(args.paging.limit.unwrap_or(page_size)),
        status_in: args
            .statuses
            .iter()
            .map(|status| CardDisputeStatus::from(status.as_str()))
            .collect(),
        ..CardDisputeList::default()
    }
}

fn check_transfer_params(args: &CheckTransfersArgs, page_size: u32) -> CheckTransferList {
    CheckTransferList {
        limit: Some(args.paging.limit.unwrap_or(page_size)),
        account_id: args.account_id.clone(),
        status_in: args
            .statuses
            .iter()
            .map(|status| CheckTransferStatus::from(status.as_str()))
            .collect(),
        ..CheckTransferList::default()
    }
}

/// Writes the pager's items as JSON lines, or one summary line per page.
///
/// Items are re-encoded through the codec, so members this client does not
/// know are printed too.
async fn drain<L, P, T>(mut pager: Pager<L, P, T>, paging: &Paging, out: &mut impl Write) -> Result<()>
where
    L: Lister<P, T, Error = ApiError>,
    P: ListParams,
    T: Record,
{
    let mut items = 0_usize;
    if paging.pages {
        while let Some(page) = pager.advance_page().await? {
            let summary = json!({
                "items": page.len(),
                "next_cursor": page.next_cursor(),
            });
            writeln!(out, "{summary}")?;
            items += page.len();
            if paging.max_items.is_some_and(|max| items >= max) {
                break;
            }
        }
    } else {
        while paging.max_items.is_none_or(|max| items < max) {
            let Some(item) = pager.advance_item().await? else {
                break;
            };
            out.write_all(&api_types::encode(item))?;
            out.write_all(b"\n")?;
            items += 1;
        }
    }
    out.flush()?;

    tracing::info!(items, pages = pager.pages_fetched(), "listing finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        future::{Future, ready},
        sync::Mutex,
    };

    use api_types::{ListEnvelope, from_value};
    use bank_client::PageError;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    use super::*;

    fn server_error() -> ApiError {
        ApiError::Server {
            status: 503_u16.try_into().unwrap(),
            kind: None,
            message: "Service Unavailable".to_string(),
        }
    }

    struct Scripted(Mutex<VecDeque<std::result::Result<ListEnvelope<Transaction>, ApiError>>>);

    impl Scripted {
        fn new(pages: Vec<std::result::Result<ListEnvelope<Transaction>, ApiError>>) -> Self {
            Self(Mutex::new(pages.into()))
        }
    }

    impl Lister<TransactionList, Transaction> for Scripted {
        type Error = ApiError;

        fn list(
            &self,
            _params: &TransactionList,
        ) -> impl Future<Output = std::result::Result<ListEnvelope<Transaction>, ApiError>> + Send
        {
            let next = self.0.lock().unwrap().pop_front().unwrap_or_else(|| Err(server_error()));
            ready(next)
        }
    }

    fn transaction(id: &str) -> Transaction {
        from_value(json!({"id": id, "amount": 0, "future_field": {"nested": true}})).unwrap()
    }

    fn pager(lister: &Scripted) -> Pager<&Scripted, TransactionList, Transaction> {
        Pager::new(lister, TransactionList::default())
    }

    fn two_pages() -> Scripted {
        Scripted::new(vec![
            Ok(ListEnvelope::new(vec![transaction("t_1"), transaction("t_2")], Some("c1"))),
            Ok(ListEnvelope::new(vec![transaction("t_3")], None)),
        ])
    }

    fn lines(out: Vec<u8>) -> Vec<Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn prints_items_with_unknown_members() {
        let lister = two_pages();
        let mut out = Vec::new();
        drain(pager(&lister), &Paging::default(), &mut out)
            .await
            .unwrap();

        let printed = lines(out);
        assert_eq!(printed.len(), 3);
        assert_eq!(
            printed[0],
            json!({"id": "t_1", "amount": 0, "future_field": {"nested": true}})
        );
        assert_eq!(printed[2]["id"], "t_3");
    }

    #[tokio::test]
    async fn max_items_stops_before_the_next_fetch() {
        let lister = two_pages();
        let paging = Paging {
            max_items: Some(2),
            ..Paging::default()
        };
        let mut out = Vec::new();
        drain(pager(&lister), &paging, &mut out)
            .await
            .unwrap();

        assert_eq!(lines(out).len(), 2);
        // The second page is still queued.
        assert_eq!(lister.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn page_mode_prints_summaries() {
        let lister = two_pages();
        let paging = Paging {
            pages: true,
            ..Paging::default()
        };
        let mut out = Vec::new();
        drain(pager(&lister), &paging, &mut out)
            .await
            .unwrap();

        assert_eq!(
            lines(out),
            vec![
                json!({"items": 2, "next_cursor": "c1"}),
                json!({"items": 1, "next_cursor": null}),
            ]
        );
    }

    #[tokio::test]
    async fn fetch_errors_reach_the_caller() {
        let lister = Scripted::new(vec![
            Ok(ListEnvelope::new(vec![transaction("t_1")], Some("c1"))),
            Err(server_error()),
        ]);
        let mut out = Vec::new();
        let err = drain(pager(&lister), &Paging::default(), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Page(PageError::Fetch { ref cursor, .. }) if cursor.as_deref() == Some("c1")
        ));
        assert_eq!(lines(out).len(), 1);
    }

    #[test]
    fn transaction_filters_map_to_params() {
        let args = TransactionsArgs {
            account_id: Some("account_1".to_string()),
            categories: vec!["card_refund".to_string(), "brand_new".to_string()],
            created_after: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..TransactionsArgs::default()
        };
        let params = transaction_params(&args, 50);

        assert_eq!(params.limit, Some(50));
        assert_eq!(
            params.category_in,
            vec![
                TransactionSourceCategory::CardRefund,
                TransactionSourceCategory::Other("brand_new".to_string()),
            ]
        );
        let query = params.to_query();
        assert_eq!(query.get("created_at.after"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(query.get("category.in"), Some("card_refund,brand_new"));
    }

    #[test]
    fn explicit_limit_wins_over_page_size() {
        let args = CheckTransfersArgs {
            statuses: vec!["mailed".to_string()],
            paging: Paging {
                limit: Some(10),
                ..Paging::default()
            },
            ..CheckTransfersArgs::default()
        };
        let params = check_transfer_params(&args, 100);
        assert_eq!(params.limit, Some(10));
        assert_eq!(params.status_in, vec![CheckTransferStatus::Mailed]);
    }

    #[test]
    fn missing_api_key_is_a_usage_error() {
        let err = client(&AppConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
    }
}
