//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Restrooms seeded at startup.
    restrooms (id) {
        id -> Int4,
        #[max_length = 120]
        name -> Varchar,
        #[max_length = 120]
        building -> Varchar,
        #[max_length = 120]
        floor -> Varchar,
    }
}

diesel::table! {
    /// Custodial staff seeded at startup.
    custodians (id) {
        id -> Int4,
        #[max_length = 120]
        name -> Varchar,
        /// One of `male`, `female`, `other`.
        #[max_length = 16]
        gender -> Varchar,
    }
}

diesel::table! {
    /// Append-only inspection records.
    checks (id) {
        id -> Int4,
        custodian_id -> Int4,
        restroom_id -> Int4,
        checked_at -> Timestamptz,
        note -> Nullable<Text>,
    }
}

diesel::table! {
    /// Reported problems. `pending` and `resolved_at` change together.
    incidents (id) {
        id -> Int4,
        custodian_id -> Int4,
        restroom_id -> Int4,
        description -> Text,
        #[max_length = 32]
        severity -> Varchar,
        created_at -> Timestamptz,
        pending -> Bool,
        resolved_at -> Nullable<Timestamptz>,
        last_checked_at -> Nullable<Timestamptz>,
        last_checked_by -> Nullable<Int4>,
    }
}

diesel::joinable!(checks -> restrooms (restroom_id));
diesel::joinable!(incidents -> restrooms (restroom_id));

diesel::allow_tables_to_appear_in_same_query!(restrooms, custodians, checks, incidents);
