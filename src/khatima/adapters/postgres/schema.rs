//! Diesel schema for khatima persistence.

diesel::table! {
    /// Khatima projects.
    khatima_projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Unique display name.
        #[max_length = 255]
        name -> Varchar,
        /// Unique invitation code.
        #[max_length = 32]
        invitation_code -> Varchar,
        /// Creator and admin.
        admin_id -> Uuid,
        /// Whether every unit is done.
        is_complete -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Juz' units, thirty per project.
    khatima_units (id) {
        /// Unit identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Position within the project, 1 to 30.
        number -> Int2,
        /// Claimant, if any.
        claimed_by -> Nullable<Uuid>,
        /// Whether the unit is finished.
        is_done -> Bool,
    }
}

diesel::table! {
    /// Project membership.
    khatima_participants (user_id, project_id) {
        /// Participating user.
        user_id -> Uuid,
        /// Joined project.
        project_id -> Uuid,
        /// Time the user joined.
        joined_at -> Timestamptz,
    }
}

diesel::joinable!(khatima_units -> khatima_projects (project_id));
diesel::joinable!(khatima_participants -> khatima_projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(
    khatima_projects,
    khatima_units,
    khatima_participants,
);
