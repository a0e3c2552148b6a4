//! Diesel schema for board persistence.

diesel::table! {
    /// Board columns.
    board_columns (id) {
        /// Column identifier.
        id -> Int8,
        /// Column lifecycle state.
        #[max_length = 50]
        state -> Varchar,
    }
}

diesel::table! {
    /// Task owners.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Email address, unique when present.
        #[max_length = 320]
        email -> Nullable<Varchar>,
        /// First name.
        #[max_length = 255]
        name -> Nullable<Varchar>,
        /// Last name.
        #[max_length = 255]
        last_name -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Task records with their column placement.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Optional owner reference.
        owner_id -> Nullable<Uuid>,
        /// Column reference.
        column_id -> Int8,
        /// Rank within the column, unique per column.
        task_order -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> board_columns (column_id));
diesel::joinable!(tasks -> users (owner_id));
diesel::allow_tables_to_appear_in_same_query!(board_columns, tasks, users);
