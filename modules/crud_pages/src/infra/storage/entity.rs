//! SeaORM entities for fixed tables
//!
//! Module tables are addressed dynamically by name; only the error log has a
//! static shape.

/// Client error log
pub mod error_log {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "error_logs")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        /// Error message as reported
        #[sea_orm(column_type = "Text")]
        pub message: String,

        /// Stack trace, if the client sent one
        #[sea_orm(column_type = "Text", nullable)]
        pub stack: Option<String>,

        /// Page the error happened on
        pub url: Option<String>,

        pub user_agent: Option<String>,

        /// Acting user at the time of the error
        pub reported_by: Option<String>,

        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
