//! Transactions and their sources.
//!
//! A transaction is an immutable ledger entry on an account. Its
//! [`TransactionSource`] says what caused it: a card refund, an inbound wire,
//! interest, and so on. New source categories appear server-side over time;
//! older clients keep decoding them through the `Unknown` case of
//! [`TransactionSourceVariant`].
use crate::{Currency, ListParams, Query, Resource, TimeRange};

open_enum! {
    /// Kind of route a transaction came through.
    pub enum RouteType {
        AccountNumber => "account_number",
        Card => "card",
        Lockbox => "lockbox",
    }
}

open_enum! {
    pub enum InternalSourceReason {
        AccountClosure => "account_closure",
        BankDrawnCheck => "bank_drawn_check",
        BankMigration => "bank_migration",
        Cashback => "cashback",
        CheckAdjustment => "check_adjustment",
        EmpyrealAdjustment => "empyreal_adjustment",
        Error => "error",
        ErrorCorrection => "error_correction",
        Fees => "fees",
        Interest => "interest",
        NegativeBalanceForgiveness => "negative_balance_forgiveness",
        SampleFunds => "sample_funds",
        SampleFundsReturn => "sample_funds_return",
    }
}

record! {
    pub struct AccountTransferIntention {
        amount: i64,
        currency: Currency,
        description: String,
        destination_account_id: String,
        source_account_id: String,
        transfer_id: String,
    }
}

record! {
    pub struct AchTransferIntention {
        account_number: String,
        amount: i64,
        routing_number: String,
        statement_descriptor: String,
        transfer_id: String,
    }
}

record! {
    pub struct AchTransferRejection {
        transfer_id: String,
    }
}

record! {
    pub struct AchTransferReturn {
        created_at: String,
        raw_return_reason_code: String,
        return_reason_code: String,
        trace_number: String,
        transaction_id: String,
        transfer_id: String,
    }
}

record! {
    pub struct CardDisputeAcceptance {
        accepted_at: String,
        card_dispute_id: String,
        transaction_id: String,
    }
}

record! {
    pub struct CardDisputeLoss {
        card_dispute_id: String,
        explanation: String,
        lost_at: String,
        transaction_id: String,
    }
}

record! {
    /// Money returned to a card by a merchant.
    pub struct CardRefund {
        id: String,
        amount: i64,
        card_payment_id: String,
        currency: Currency,
        merchant_acceptor_id: String,
        merchant_category_code: String,
        merchant_city: String,
        merchant_country: String,
        merchant_name: String,
        presentment_amount: i64,
        presentment_currency: String,
        transaction_id: String,
        kind as "type": String,
    }
}

record! {
    pub struct CardRevenuePayment {
        amount: i64,
        currency: Currency,
        period_end: String,
        period_start: String,
        transacted_on_account_id: String,
    }
}

record! {
    /// Final clearing of a card authorization.
    pub struct CardSettlement {
        id: String,
        amount: i64,
        card_authorization: String,
        card_payment_id: String,
        currency: Currency,
        merchant_acceptor_id: String,
        merchant_category_code: String,
        merchant_city: String,
        merchant_country: String,
        merchant_name: String,
        pending_transaction_id: String,
        presentment_amount: i64,
        presentment_currency: String,
        transaction_id: String,
        kind as "type": String,
    }
}

record! {
    pub struct CashbackPayment {
        accrued_on_card_id: String,
        amount: i64,
        currency: Currency,
        period_end: String,
        period_start: String,
    }
}

record! {
    pub struct CheckDepositAcceptance {
        account_number: String,
        amount: i64,
        auxiliary_on_us: String,
        check_deposit_id: String,
        currency: Currency,
        routing_number: String,
        serial_number: String,
    }
}

record! {
    pub struct CheckDepositReturn {
        amount: i64,
        check_deposit_id: String,
        currency: Currency,
        return_reason: String,
        returned_at: String,
        transaction_id: String,
    }
}

record! {
    pub struct CheckTransferDeposit {
        back_image_file_id: String,
        bank_of_first_deposit_routing_number: String,
        deposited_at: String,
        front_image_file_id: String,
        inbound_check_deposit_id: String,
        transaction_id: String,
        transfer_id: String,
        kind as "type": String,
    }
}

record! {
    pub struct FeePayment {
        amount: i64,
        currency: Currency,
        fee_period_start: String,
        program_id: String,
    }
}

record! {
    pub struct InboundAchTransfer {
        amount: i64,
        originator_company_descriptive_date: String,
        originator_company_discretionary_data: String,
        originator_company_entry_description: String,
        originator_company_id: String,
        originator_company_name: String,
        receiver_id_number: String,
        receiver_name: String,
        trace_number: String,
        transfer_id: String,
    }
}

record! {
    pub struct InboundRealTimePaymentsTransferConfirmation {
        amount: i64,
        creditor_name: String,
        currency: Currency,
        debtor_account_number: String,
        debtor_name: String,
        debtor_routing_number: String,
        remittance_information: String,
        transaction_identification: String,
        transfer_id: String,
    }
}

record! {
    pub struct InboundWireReversal {
        amount: i64,
        created_at: String,
        description: String,
        input_message_accountability_data: String,
        originator_routing_number: String,
        previous_message_input_message_accountability_data: String,
        transaction_id: String,
        wire_transfer_id: String,
    }
}

record! {
    pub struct InboundWireTransfer {
        amount: i64,
        beneficiary_address_line1: String,
        beneficiary_name: String,
        beneficiary_reference: String,
        description: String,
        input_message_accountability_data: String,
        originator_address_line1: String,
        originator_name: String,
        originator_routing_number: String,
        originator_to_beneficiary_information: String,
        transfer_id: String,
    }
}

record! {
    pub struct InterestPayment {
        accrued_on_account_id: String,
        amount: i64,
        currency: Currency,
        period_end: String,
        period_start: String,
    }
}

record! {
    /// Movement initiated by the bank itself.
    pub struct InternalSource {
        amount: i64,
        currency: Currency,
        reason: InternalSourceReason,
    }
}

record! {
    pub struct RealTimePaymentsTransferAcknowledgement {
        amount: i64,
        destination_account_number: String,
        destination_routing_number: String,
        remittance_information: String,
        transfer_id: String,
    }
}

record! {
    pub struct SampleFunds {
        originator: String,
    }
}

record! {
    pub struct WireTransferIntention {
        account_number: String,
        amount: i64,
        message_to_recipient: String,
        routing_number: String,
        transfer_id: String,
    }
}

tagged_union! {
    /// What caused a transaction.
    ///
    /// `category` names the payload; the server sends the matching key and,
    /// usually, `null` for every other one.
    pub struct TransactionSource;
    /// Category of a [`TransactionSource`].
    pub enum TransactionSourceCategory;
    /// The payload of a [`TransactionSource`] selected by its category.
    pub enum TransactionSourceVariant;
    discriminant: category;
    variants {
        "account_transfer_intention" => AccountTransferIntention(
            account_transfer_intention: AccountTransferIntention
        ),
        "ach_transfer_intention" => AchTransferIntention(
            ach_transfer_intention: AchTransferIntention
        ),
        "ach_transfer_rejection" => AchTransferRejection(
            ach_transfer_rejection: AchTransferRejection
        ),
        "ach_transfer_return" => AchTransferReturn(ach_transfer_return: AchTransferReturn),
        "card_dispute_acceptance" => CardDisputeAcceptance(
            card_dispute_acceptance: CardDisputeAcceptance
        ),
        "card_dispute_loss" => CardDisputeLoss(card_dispute_loss: CardDisputeLoss),
        "card_refund" => CardRefund(card_refund: CardRefund),
        "card_revenue_payment" => CardRevenuePayment(card_revenue_payment: CardRevenuePayment),
        "card_settlement" => CardSettlement(card_settlement: CardSettlement),
        "cashback_payment" => CashbackPayment(cashback_payment: CashbackPayment),
        "check_deposit_acceptance" => CheckDepositAcceptance(
            check_deposit_acceptance: CheckDepositAcceptance
        ),
        "check_deposit_return" => CheckDepositReturn(check_deposit_return: CheckDepositReturn),
        "check_transfer_deposit" => CheckTransferDeposit(
            check_transfer_deposit: CheckTransferDeposit
        ),
        "fee_payment" => FeePayment(fee_payment: FeePayment),
        "inbound_ach_transfer" => InboundAchTransfer(inbound_ach_transfer: InboundAchTransfer),
        "inbound_real_time_payments_transfer_confirmation" => InboundRealTimePaymentsTransferConfirmation(
            inbound_real_time_payments_transfer_confirmation: InboundRealTimePaymentsTransferConfirmation
        ),
        "inbound_wire_reversal" => InboundWireReversal(inbound_wire_reversal: InboundWireReversal),
        "inbound_wire_transfer" => InboundWireTransfer(inbound_wire_transfer: InboundWireTransfer),
        "interest_payment" => InterestPayment(interest_payment: InterestPayment),
        "internal_source" => InternalSource(internal_source: InternalSource),
        "real_time_payments_transfer_acknowledgement" => RealTimePaymentsTransferAcknowledgement(
            real_time_payments_transfer_acknowledgement: RealTimePaymentsTransferAcknowledgement
        ),
        "sample_funds" => SampleFunds(sample_funds: SampleFunds),
        "wire_transfer_intention" => WireTransferIntention(
            wire_transfer_intention: WireTransferIntention
        ),
    }
}

record! {
    /// A posted ledger entry.
    pub struct Transaction {
        id: String,
        account_id: String,
        /// Signed amount in the currency's minor unit.
        amount: i64,
        currency: Currency,
        /// ISO 8601 timestamp, kept as sent.
        created_at: String,
        description: String,
        route_id: String,
        route_type: RouteType,
        source: TransactionSource,
        kind as "type": String,
    }
}

impl Resource for Transaction {
    const LIST_PATH: &'static str = "transactions";

    type ListParams = TransactionList;
}

/// Parameters of `GET /transactions`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionList {
    /// Opaque pagination cursor, from `next_cursor`.
    pub cursor: Option<String>,
    /// Page size; the server caps it at 100.
    pub limit: Option<u32>,
    pub account_id: Option<String>,
    pub route_id: Option<String>,
    pub created_at: TimeRange,
    /// Sent as `category.in`.
    pub category_in: Vec<TransactionSourceCategory>,
}

impl ListParams for TransactionList {
    fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    fn set_cursor(&mut self, cursor: Option<String>) {
        self.cursor = cursor;
    }

    fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .push_opt("cursor", self.cursor.as_deref())
            .push_opt("limit", self.limit)
            .push_opt("account_id", self.account_id.as_deref())
            .push_opt("route_id", self.route_id.as_deref())
            .push_time_range("created_at", &self.created_at)
            .push_list("category.in", &self.category_in);
        query
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn list_query_flattens_filters() {
        let params = TransactionList {
            cursor: Some("cursor_1".to_string()),
            limit: Some(10),
            account_id: Some("account_in71c4amph0vgo2qllky".to_string()),
            created_at: TimeRange {
                on_or_after: Some(Utc.with_ymd_and_hms(2020, 1, 31, 23, 59, 59).unwrap()),
                ..TimeRange::default()
            },
            category_in: vec![
                TransactionSourceCategory::CardRefund,
                TransactionSourceCategory::from("card_push_transfer_acceptance"),
            ],
            ..TransactionList::default()
        };

        let query = params.to_query();
        assert_eq!(query.get("cursor"), Some("cursor_1"));
        assert_eq!(query.get("limit"), Some("10"));
        assert_eq!(
            query.get("account_id"),
            Some("account_in71c4amph0vgo2qllky")
        );
        assert_eq!(query.get("route_id"), None);
        assert_eq!(
            query.get("created_at.on_or_after"),
            Some("2020-01-31T23:59:59Z")
        );
        assert_eq!(
            query.get("category.in"),
            Some("card_refund,card_push_transfer_acceptance")
        );
    }

    #[test]
    fn set_cursor_leaves_filters_alone() {
        let mut params = TransactionList {
            account_id: Some("account_1".to_string()),
            ..TransactionList::default()
        };
        params.set_cursor(Some("next".to_string()));

        assert_eq!(params.cursor(), Some("next"));
        assert_eq!(params.account_id.as_deref(), Some("account_1"));
    }

    #[test]
    fn every_category_has_a_payload_accessor() {
        let source = TransactionSource::default();
        assert!(source.variant() == TransactionSourceVariant::Unknown {
            category: None,
            payload: None,
        });
        assert!(source.is_consistent());
        assert!(source.card_settlement().is_none());
        assert!(source.wire_transfer_intention().is_none());
    }
}
