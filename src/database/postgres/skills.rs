use async_trait::async_trait;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewSkill, Skill, SkillChanges};
use crate::database::store::SkillStore;

#[async_trait]
impl SkillStore for PgStore {
    async fn create_skills(&self, user_id: i64, skills: Vec<NewSkill>) -> Result<Vec<Skill>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(skills.len());

        for skill in &skills {
            let row = sqlx::query_as::<_, Skill>(
                "INSERT INTO skills (user_id, skill, level, rating) VALUES ($1, $2, $3, $4)
                 RETURNING id, user_id, skill, level, rating, created_at",
            )
            .bind(user_id)
            .bind(&skill.skill)
            .bind(&skill.level)
            .bind(skill.rating)
            .fetch_one(&mut *tx)
            .await?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn skills_for_user(&self, user_id: i64) -> Result<Vec<Skill>, DatabaseError> {
        let skills = sqlx::query_as::<_, Skill>(
            "SELECT id, user_id, skill, level, rating, created_at FROM skills WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    async fn all_skills(&self) -> Result<Vec<Skill>, DatabaseError> {
        let skills = sqlx::query_as::<_, Skill>("SELECT id, user_id, skill, level, rating, created_at FROM skills ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(skills)
    }

    async fn update_skill(&self, id: i64, changes: SkillChanges) -> Result<Option<Skill>, DatabaseError> {
        let skill = sqlx::query_as::<_, Skill>(
            "UPDATE skills SET
                user_id = COALESCE($2, user_id),
                skill = $3,
                level = $4,
                rating = $5
             WHERE id = $1
             RETURNING id, user_id, skill, level, rating, created_at",
        )
        .bind(id)
        .bind(changes.user_id)
        .bind(&changes.skill)
        .bind(&changes.level)
        .bind(changes.rating)
        .fetch_optional(&self.pool)
        .await?;
        Ok(skill)
    }

    async fn delete_skill(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
