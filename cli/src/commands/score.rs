//! score / classify / assess 命令实现
use std::fmt::Write as _;

use launchpad_core::api::{
    self as core_api, match_quality_label, normalize_score, rank_careers, AssessmentAnswers,
    RankedCareer, RouteClassification,
};
use serde::Serialize;
use serde_json::json;

use crate::commands::cli::{AssessArgs, ClassifyArgs, OutputFormat, ScoreArgs};

/// 处理 score 命令
pub fn handle_score(args: ScoreArgs) -> Result<(), core_api::CliError> {
    print!("{}", render_scores(&args.scores, args.format)?);
    Ok(())
}

/// 处理 classify 命令（使用配置中的路由表）
pub fn handle_classify(
    args: ClassifyArgs,
    ctx: &core_api::AppContext,
) -> Result<(), core_api::CliError> {
    let table = ctx.cfg().gate.route_table()?;
    let routes: Vec<RouteClassification> = args.paths.iter().map(|p| table.classify(p)).collect();
    print!("{}", render_routes(&routes, args.format)?);
    Ok(())
}

/// 处理 assess 命令：提交访客测评并输出排序后的职业
pub async fn handle_assess(
    args: AssessArgs,
    ctx: &core_api::AppContext,
) -> Result<(), core_api::CliError> {
    let raw = tokio::fs::read_to_string(&args.answers).await?;
    let answers: AssessmentAnswers = serde_json::from_str(&raw).map_err(|e| {
        core_api::CliError::Command(format!(
            "invalid answers file {}: {e}",
            args.answers.display()
        ))
    })?;
    if answers.is_empty() {
        return Err(core_api::CliError::Command(
            "answers file contains no answers".to_string(),
        ));
    }

    let services = ctx.build_services().await?;
    let result = services
        .scoring
        .submit_guest_assessment(&answers)
        .await
        .map_err(|e| core_api::CliError::Api(format!("assessment failed: {e:#}")))?;

    tracing::info!(
        target: "launchpad.api",
        answers = answers.len(),
        careers = result.ranking.len(),
        "guest assessment scored"
    );

    let ranked = rank_careers(&result.ranking, args.limit);
    print!("{}", render_ranked(&ranked, args.format)?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ScoreLine {
    score: f64,
    percentage: u8,
    label: &'static str,
}

pub fn render_scores(scores: &[f64], format: OutputFormat) -> Result<String, core_api::CliError> {
    let lines: Vec<ScoreLine> = scores
        .iter()
        .map(|&score| {
            let percentage = normalize_score(score);
            ScoreLine {
                score,
                percentage,
                label: match_quality_label(percentage),
            }
        })
        .collect();

    match format {
        OutputFormat::Json => to_pretty(&json!({ "scores": lines })),
        OutputFormat::Text => {
            let mut out = String::new();
            for l in &lines {
                let _ = writeln!(out, "{:>8.3}  {:>3}%  {}", l.score, l.percentage, l.label);
            }
            Ok(out)
        }
    }
}

pub fn render_routes(
    routes: &[RouteClassification],
    format: OutputFormat,
) -> Result<String, core_api::CliError> {
    match format {
        OutputFormat::Json => to_pretty(&json!({ "routes": routes })),
        OutputFormat::Text => {
            let mut out = String::new();
            for r in routes {
                let _ = writeln!(out, "{}\t{}", r.path, r.category);
            }
            Ok(out)
        }
    }
}

pub fn render_ranked(
    ranked: &[RankedCareer],
    format: OutputFormat,
) -> Result<String, core_api::CliError> {
    match format {
        OutputFormat::Json => to_pretty(&json!({ "careers": ranked, "count": ranked.len() })),
        OutputFormat::Text => {
            if ranked.is_empty() {
                return Ok("No career matches returned.\n".to_string());
            }
            let mut out = String::new();
            for c in ranked {
                let _ = writeln!(
                    out,
                    "{:>2}. {} [{}]  {}% {}",
                    c.rank, c.title, c.code, c.percentage, c.label
                );
                let _ = writeln!(out, "    {}", c.reasoning);
            }
            Ok(out)
        }
    }
}

fn to_pretty(value: &serde_json::Value) -> Result<String, core_api::CliError> {
    let mut s = serde_json::to_string_pretty(value)
        .map_err(|e| core_api::CliError::Command(format!("serialize output failed: {e}")))?;
    s.push('\n');
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_core::api::{CareerRanking, GateConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_scores_text() {
        let out = render_scores(&[-8.0, 2.5, 4.0], OutputFormat::Text).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("0%  Poor match"));
        assert!(lines[1].ends_with("80%  Excellent match"));
        assert!(lines[2].ends_with("100%  Excellent match"));
    }

    #[test]
    fn test_render_scores_json() {
        let out = render_scores(&[0.0], OutputFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["scores"][0]["percentage"], 60);
        assert_eq!(v["scores"][0]["label"], "Very good match");
    }

    #[test]
    fn test_render_routes_text() {
        let table = GateConfig::default().route_table().unwrap();
        let routes = vec![
            table.classify("/_next/static/a.js"),
            table.classify("/login"),
            table.classify("/student/portfolio"),
        ];
        let out = render_routes(&routes, OutputFormat::Text).unwrap();
        let categories: Vec<&str> = out
            .lines()
            .filter_map(|l| l.split('\t').nth(1))
            .collect();
        assert_eq!(categories, vec!["skipped", "public", "protected"]);
    }

    #[test]
    fn test_render_ranked_orders_and_labels() {
        let ranking = vec![
            CareerRanking {
                code: "a".into(),
                title: "Nurse".into(),
                score: -1.0,
            },
            CareerRanking {
                code: "b".into(),
                title: "Engineer".into(),
                score: 3.0,
            },
        ];
        let out = render_ranked(&rank_careers(&ranking, 1), OutputFormat::Text).unwrap();
        assert!(out.starts_with(" 1. Engineer [b]  86% Excellent match"));
        assert!(!out.contains("Nurse"));
    }

    fn ctx_for(server_url: String) -> core_api::AppContext {
        let mut cfg = core_api::AppConfig::default();
        cfg.scoring_api.base_url = server_url;
        core_api::AppContext::new(
            cfg,
            Some(std::sync::Arc::new(
                launchpad_plugins::services::PluginServicesFactory,
            )),
        )
    }

    #[tokio::test]
    async fn test_assess_submits_answers_to_guest_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/guest/assessment")
            .match_body(mockito::Matcher::Json(json!({"answers": {"q1": 4.0, "q2": 1.0}})))
            .with_status(200)
            .with_body(r#"{"ranking":[["c1","Nurse",2.0],["c2","Chef",-1.0]]}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let answers = dir.path().join("answers.json");
        std::fs::write(&answers, r#"{"q1": 4, "q2": 1}"#).unwrap();

        let args = AssessArgs {
            answers,
            limit: 5,
            format: OutputFormat::Json,
        };
        handle_assess(args, &ctx_for(server.url())).await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_assess_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/guest/assessment")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let answers = dir.path().join("answers.json");
        std::fs::write(&answers, r#"{"q1": 4}"#).unwrap();

        let args = AssessArgs {
            answers,
            limit: 5,
            format: OutputFormat::Text,
        };
        let err = handle_assess(args, &ctx_for(server.url())).await.unwrap_err();
        assert!(matches!(err, core_api::CliError::Api(_)));
    }

    #[tokio::test]
    async fn test_assess_rejects_empty_answers() {
        let dir = tempfile::tempdir().unwrap();
        let answers = dir.path().join("answers.json");
        std::fs::write(&answers, "{}").unwrap();

        let args = AssessArgs {
            answers,
            limit: 5,
            format: OutputFormat::Text,
        };
        let err = handle_assess(args, &ctx_for("http://127.0.0.1:9".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, core_api::CliError::Command(_)));
    }

    #[test]
    fn test_render_ranked_empty() {
        let out = render_ranked(&[], OutputFormat::Text).unwrap();
        assert_eq!(out, "No career matches returned.\n");
    }
}
