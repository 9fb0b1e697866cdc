//! 基础请求验证逻辑

use launchpad_core::api::{AssessmentAnswers, ProjectEntry, StudentComment, WorkExperience};

use super::models::HttpServerError;

const MAX_USER_ID_LEN: usize = 128;
const MAX_ANSWERS: usize = 500;
const MAX_SCORES: usize = 1000;
const MAX_TEXT_LEN: usize = 5000;

/// 验证user_id格式（仅允许字母数字、下划线、连字符）
pub fn validate_user_id(user_id: &str) -> Result<(), HttpServerError> {
    if user_id.is_empty() {
        return Err(HttpServerError::InvalidRequest(
            "User ID cannot be empty".to_string(),
        ));
    }

    if user_id.len() > MAX_USER_ID_LEN {
        return Err(HttpServerError::InvalidRequest(format!(
            "User ID too long ({} chars, max {MAX_USER_ID_LEN})",
            user_id.len()
        )));
    }

    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(HttpServerError::InvalidRequest(
            "User ID can only contain alphanumeric, underscore, and hyphen characters"
                .to_string(),
        ));
    }

    Ok(())
}

/// 验证测评答案
pub fn validate_answers(answers: &AssessmentAnswers) -> Result<(), HttpServerError> {
    if answers.is_empty() {
        return Err(HttpServerError::InvalidRequest(
            "Answers cannot be empty".to_string(),
        ));
    }
    if answers.len() > MAX_ANSWERS {
        return Err(HttpServerError::InvalidRequest(format!(
            "Too many answers ({}, max {MAX_ANSWERS})",
            answers.len()
        )));
    }
    for (question, value) in answers {
        if question.trim().is_empty() {
            return Err(HttpServerError::InvalidRequest(
                "Answer keys cannot be blank".to_string(),
            ));
        }
        if !value.is_finite() {
            return Err(HttpServerError::InvalidRequest(format!(
                "Answer {question} is not a finite number"
            )));
        }
    }
    Ok(())
}

/// 验证待归一化的原始分数
pub fn validate_scores(scores: &[f64]) -> Result<(), HttpServerError> {
    if scores.is_empty() {
        return Err(HttpServerError::InvalidRequest(
            "Scores cannot be empty".to_string(),
        ));
    }
    if scores.len() > MAX_SCORES {
        return Err(HttpServerError::InvalidRequest(format!(
            "Too many scores ({}, max {MAX_SCORES})",
            scores.len()
        )));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), HttpServerError> {
    if value.trim().is_empty() {
        return Err(HttpServerError::InvalidRequest(format!(
            "{field} cannot be empty"
        )));
    }
    if value.len() > MAX_TEXT_LEN {
        return Err(HttpServerError::InvalidRequest(format!(
            "{field} too long ({} chars, max {MAX_TEXT_LEN})",
            value.len()
        )));
    }
    Ok(())
}

/// 验证工作经历
pub fn validate_work_experience(entry: &WorkExperience) -> Result<(), HttpServerError> {
    require_text("title", &entry.title)?;
    require_text("organisation", &entry.organisation)?;
    require_text("start_date", &entry.start_date)
}

/// 验证项目
pub fn validate_project(project: &ProjectEntry) -> Result<(), HttpServerError> {
    require_text("title", &project.title)?;
    require_text("description", &project.description)
}

/// 验证教师评语
pub fn validate_comment(comment: &StudentComment) -> Result<(), HttpServerError> {
    validate_user_id(&comment.student_id)?;
    require_text("comment", &comment.comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("3f2b-11aa_c").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("a b").is_err());
        assert!(validate_user_id("../etc").is_err());
        assert!(validate_user_id(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_answers() {
        let mut answers = AssessmentAnswers::new();
        assert!(validate_answers(&answers).is_err());

        answers.insert("q1".into(), 4.0);
        assert!(validate_answers(&answers).is_ok());

        answers.insert("q2".into(), f64::INFINITY);
        match validate_answers(&answers) {
            Err(HttpServerError::InvalidRequest(msg)) => assert!(msg.contains("q2")),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_answers_blank_key() {
        let mut answers = AssessmentAnswers::new();
        answers.insert("  ".into(), 1.0);
        assert!(validate_answers(&answers).is_err());
    }

    #[test]
    fn test_validate_comment() {
        let mut comment = StudentComment {
            student_id: "s-1".into(),
            comment: "Strong in maths".into(),
            category: Some("academic".into()),
        };
        assert!(validate_comment(&comment).is_ok());

        comment.comment = "   ".into();
        assert!(validate_comment(&comment).is_err());

        comment.comment = "ok".into();
        comment.student_id = "s/1".into();
        assert!(validate_comment(&comment).is_err());
    }

    #[test]
    fn test_validate_work_experience_requires_start_date() {
        let entry = WorkExperience {
            title: "Barista".into(),
            organisation: "Cafe".into(),
            description: None,
            start_date: String::new(),
            end_date: None,
        };
        match validate_work_experience(&entry) {
            Err(HttpServerError::InvalidRequest(msg)) => assert!(msg.contains("start_date")),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_scores() {
        assert!(validate_scores(&[]).is_err());
        assert!(validate_scores(&[1.0, -3.0]).is_ok());
        assert!(validate_scores(&vec![0.0; 1001]).is_err());
    }
}
