//! Check transfers: paper checks printed and mailed on behalf of an account.
use crate::{Currency, ListParams, Query, Resource, TimeRange};

open_enum! {
    pub enum CheckTransferStatus {
        PendingApproval => "pending_approval",
        Canceled => "canceled",
        PendingSubmission => "pending_submission",
        RequiresAttention => "requires_attention",
        Rejected => "rejected",
        PendingMailing => "pending_mailing",
        Mailed => "mailed",
        Deposited => "deposited",
        Stopped => "stopped",
        Returned => "returned",
    }
}

open_enum! {
    pub enum FulfillmentMethod {
        PhysicalCheck => "physical_check",
        ThirdParty => "third_party",
    }
}

open_enum! {
    pub enum StopPaymentReason {
        MailDeliveryFailed => "mail_delivery_failed",
        RejectedByIncrease => "rejected_by_increase",
        NotAuthorized => "not_authorized",
        Unknown => "unknown",
    }
}

record! {
    pub struct Address {
        city: String,
        line1: String,
        line2: String,
        name: String,
        postal_code: String,
        state: String,
    }
}

record! {
    /// Details printed on, and used to mail, a physical check.
    pub struct PhysicalCheck {
        mailing_address: Address,
        memo: String,
        note: String,
        recipient_name: String,
        return_address: Address,
        signature_text: String,
    }
}

record! {
    pub struct Approval {
        approved_at: String,
        approved_by: String,
    }
}

record! {
    pub struct Cancellation {
        canceled_at: String,
        canceled_by: String,
    }
}

record! {
    pub struct Submission {
        submitted_at: String,
    }
}

record! {
    pub struct Mailing {
        image_id: String,
        mailed_at: String,
        tracking_number: String,
    }
}

record! {
    pub struct StopPaymentRequest {
        reason: StopPaymentReason,
        requested_at: String,
        transfer_id: String,
        kind as "type": String,
    }
}

record! {
    pub struct CheckTransfer {
        id: String,
        account_id: String,
        account_number: String,
        routing_number: String,
        amount: i64,
        currency: Currency,
        check_number: String,
        status: CheckTransferStatus,
        fulfillment_method: FulfillmentMethod,
        physical_check: PhysicalCheck,
        approval: Approval,
        cancellation: Cancellation,
        submission: Submission,
        mailing: Mailing,
        stop_payment_request: StopPaymentRequest,
        created_at: String,
        idempotency_key: String,
        kind as "type": String,
    }
}

impl Resource for CheckTransfer {
    const LIST_PATH: &'static str = "check_transfers";

    type ListParams = CheckTransferList;
}

/// Parameters of `GET /check_transfers`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckTransferList {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub account_id: Option<String>,
    pub created_at: TimeRange,
    pub idempotency_key: Option<String>,
    /// Sent as `status.in`.
    pub status_in: Vec<CheckTransferStatus>,
}

impl ListParams for CheckTransferList {
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
            .push_time_range("created_at", &self.created_at)
            .push_opt("idempotency_key", self.idempotency_key.as_deref())
            .push_list("status.in", &self.status_in);
        query
    }
}
