use serde_json::Value;

use super::{ServiceError, ServiceResult};
use crate::database::models::{NewSkill, Skill, SkillChanges};
use crate::database::SkillStore;

/// A skill is either a bare name or `{name, level, rating}`.
pub fn parse_skill(value: &Value) -> ServiceResult<NewSkill> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Ok(NewSkill {
            skill: name.trim().to_string(),
            level: None,
            rating: None,
        }),
        Value::Object(fields) => {
            let skill = fields
                .get("name")
                .or_else(|| fields.get("skill"))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ServiceError::invalid("skills", "Each skill needs a name"))?;
            let rating = match fields.get("rating") {
                None | Some(Value::Null) => None,
                Some(v) => Some(
                    v.as_i64()
                        .and_then(|r| i32::try_from(r).ok())
                        .ok_or_else(|| ServiceError::invalid("skills", "rating must be an integer"))?,
                ),
            };
            Ok(NewSkill {
                skill: skill.to_string(),
                level: fields.get("level").and_then(Value::as_str).map(str::to_string),
                rating,
            })
        }
        _ => Err(ServiceError::invalid("skills", "Invalid data")),
    }
}

fn parse_skill_list(skills: Option<&Value>) -> ServiceResult<Vec<NewSkill>> {
    match skills {
        Some(Value::Array(items)) if !items.is_empty() => items.iter().map(parse_skill).collect(),
        _ => Err(ServiceError::invalid("skills", "Invalid data")),
    }
}

pub async fn create<S>(store: &S, user_id: Option<i64>, skills: Option<&Value>) -> ServiceResult<Vec<Skill>>
where
    S: SkillStore + ?Sized,
{
    let user_id = user_id.ok_or_else(|| ServiceError::invalid("userId", "Invalid data"))?;
    let skills = parse_skill_list(skills)?;
    Ok(store.create_skills(user_id, skills).await?)
}

pub async fn list_all<S>(store: &S) -> ServiceResult<Vec<Skill>>
where
    S: SkillStore + ?Sized,
{
    Ok(store.all_skills().await?)
}

pub async fn list_for_user<S>(store: &S, user_id: i64) -> ServiceResult<Vec<Skill>>
where
    S: SkillStore + ?Sized,
{
    Ok(store.skills_for_user(user_id).await?)
}

/// Replaces the row with the first element of `skills`
pub async fn update<S>(store: &S, id: i64, user_id: Option<i64>, skills: Option<&Value>) -> ServiceResult<Skill>
where
    S: SkillStore + ?Sized,
{
    let first = parse_skill_list(skills)?.into_iter().next();
    let Some(NewSkill { skill, level, rating }) = first else {
        return Err(ServiceError::invalid("skills", "Invalid data"));
    };

    store
        .update_skill(
            id,
            SkillChanges {
                user_id,
                skill,
                level,
                rating,
            },
        )
        .await?
        .ok_or_else(|| ServiceError::not_found("Skill not found"))
}

pub async fn delete<S>(store: &S, id: i64) -> ServiceResult<()>
where
    S: SkillStore + ?Sized,
{
    if store.delete_skill(id).await? {
        Ok(())
    } else {
        Err(ServiceError::not_found("Skill not found"))
    }
}
