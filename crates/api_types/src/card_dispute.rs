//! Card disputes: a cardholder contesting a settled card transaction.
use crate::{ListParams, Query, Resource, TimeRange};

open_enum! {
    pub enum CardDisputeStatus {
        PendingReviewing => "pending_reviewing",
        PendingUserInformation => "pending_user_information",
        Accepted => "accepted",
        Rejected => "rejected",
        Lost => "lost",
        Won => "won",
    }
}

impl CardDisputeStatus {
    /// `true` once the dispute can no longer change.
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Rejected | Self::Lost | Self::Won)
    }
}

record! {
    pub struct DisputeAcceptance {
        accepted_at: String,
        card_dispute_id: String,
        transaction_id: String,
    }
}

record! {
    pub struct DisputeRejection {
        card_dispute_id: String,
        explanation: String,
        rejected_at: String,
    }
}

record! {
    pub struct DisputeLoss {
        card_dispute_id: String,
        explanation: String,
        lost_at: String,
        transaction_id: String,
    }
}

record! {
    pub struct DisputeWin {
        card_dispute_id: String,
        won_at: String,
    }
}

record! {
    pub struct CardDispute {
        id: String,
        disputed_transaction_id: String,
        explanation: String,
        status: CardDisputeStatus,
        /// Disputed amount in the minor unit of the transaction's currency.
        amount: i64,
        acceptance: DisputeAcceptance,
        rejection: DisputeRejection,
        loss: DisputeLoss,
        win: DisputeWin,
        created_at: String,
        idempotency_key: String,
        kind as "type": String,
    }
}

impl Resource for CardDispute {
    const LIST_PATH: &'static str = "card_disputes";

    type ListParams = CardDisputeList;
}

/// Parameters of `GET /card_disputes`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardDisputeList {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub created_at: TimeRange,
    pub idempotency_key: Option<String>,
    /// Sent as `status.in`.
    pub status_in: Vec<CardDisputeStatus>,
}

impl ListParams for CardDisputeList {
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
            .push_time_range("created_at", &self.created_at)
            .push_opt("idempotency_key", self.idempotency_key.as_deref())
            .push_list("status.in", &self.status_in);
        query
    }
}
