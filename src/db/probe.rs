use sqlx::PgConnection;

pub(crate) const EXPECTED: i32 = 1;

pub(crate) struct SelectOneQuery;

impl SelectOneQuery {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn execute(&self, conn: &mut PgConnection) -> sqlx::Result<i32> {
        sqlx::query_scalar::<_, i32>(
            r#"
            SELECT 1
            "#,
        )
        .fetch_one(conn)
        .await
    }
}
