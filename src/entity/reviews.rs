use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub booking_id: i64,
    pub client_id: i64,
    pub lawyer_id: i64,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id"
    )]
    Bookings,
    #[sea_orm(
        belongs_to = "super::lawyers::Entity",
        from = "Column::LawyerId",
        to = "super::lawyers::Column::Id"
    )]
    Lawyers,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::lawyers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lawyers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
