//! Prompt builders for the three completion stages (generate, select, rewrite).
//!
//! All prompts end with the same hard output contract so the schema-constrained
//! call and the tolerant parser agree on the shape.

use std::fmt::Write;

use crate::{config::PipelineConfig, pool::CandidatePool, request::AdBrief};

const LIST_CONTRACT: &str = "출력은 반드시 JSON 객체로만 한다.\n\
키는 adTexts 하나만 사용하고, adTexts는 문자열 3개 배열이다.\n\
다른 텍스트는 절대 출력하지 않는다.\n";

const SINGLE_CONTRACT: &str = "출력은 반드시 JSON 객체로만 한다.\n\
키는 adText 하나만 사용하고, adText는 문자열 1개다.\n\
다른 텍스트는 절대 출력하지 않는다.\n";

/// Breadth prompt: three hooks, one per psychological trigger.
pub fn build_base_prompt(brief: &AdBrief, cfg: &PipelineConfig) -> String {
    let mut s = String::with_capacity(2048);
    let max = cfg.max_chars;
    let banned = cfg.banned_words.join(", ");

    writeln!(
        s,
        "# Role\n\
너는 10년 경력의 퍼포먼스 마케팅 카피라이터다.\n\
목표는 하나, 스크롤을 멈추고 클릭하게 만드는 것.\n\
설명적이고 점잖은 문장 대신 소비자의 본능(불안, 허영, 게으름)을 건드리는 날선 문장을 쓴다."
    )
    .ok();

    writeln!(
        s,
        "\n# Guidelines (Strict)\n\
1. 형식: 공백 포함 {max}자 이내. {max}자를 넘으면 실패다.\n\
2. 스타일:\n\
- 주어/조사는 과감히 생략하고 명사형이나 동사형으로 끊어 친다.\n\
- 금칙어 절대 금지: {banned}. \"솔루션\", \"제공합니다\" 같은 상투어도 쓰지 않는다.\n\
- 밈이나 유행어 구조를 빌리되 상품 맥락에 맞게 비튼다.\n\
3. 심리 트리거 (각 앵글로 1개씩):\n\
A. 공포/손실 회피 (지금 안 하면 손해)\n\
B. 밴드왜건 (남들은 이미 다 씀, 나만 뒤처짐)\n\
C. 극단적 효율 (귀찮음 해결, 게으른 자의 구원)"
    )
    .ok();

    writeln!(
        s,
        "\n# Examples\n\
- (Bad) 이 베개를 쓰면 잠이 잘 옵니다.\n\
- (Good) 눕자마자 기절, 알람 못 들음 주의\n\
- (Bad) 영어 공부는 꾸준히 하는 것이 중요합니다.\n\
- (Good) 원어민이 말 걸면 도망가잖아"
    )
    .ok();

    writeln!(
        s,
        "\n# Task\n트리거 A, B, C에 해당하는 초단문 카피 3개를 쓴다.\n\n[입력 정보]"
    )
    .ok();
    push_brief(&mut s, brief);

    s.push('\n');
    s.push_str(LIST_CONTRACT);
    s
}

/// Selection prompt: pick the three strongest, mutually distinct hooks from the pool.
pub fn build_selection_prompt(
    brief: &AdBrief,
    pool: &CandidatePool,
    cfg: &PipelineConfig,
) -> String {
    let mut s = String::with_capacity(2048);

    writeln!(
        s,
        "너는 10년 경력의 퍼포먼스 광고 카피라이터이자 냉정한 편집자다.\n\
아래 후보 중 CTR/전환 관점에서 가장 강한 문구 3개만 고른다.\n\n\
규칙:\n\
- 각 문구 공백 포함 {}자 이내\n\
- 금칙어: {} (절대 금지)\n\
- 세 문구의 어휘/표현이 서로 확연히 다를 것\n\
- 소개형/교과서형 문장은 제외하고 후킹을 우선한다\n\n\
광고 정보:",
        cfg.max_chars,
        cfg.banned_words.join(", ")
    )
    .ok();
    push_brief(&mut s, brief);

    writeln!(s, "\n후보 목록(여기서만 선택):").ok();
    for (i, cand) in pool.as_slice().iter().take(cfg.pool_cap).enumerate() {
        writeln!(s, "{}) {}", i + 1, cand).ok();
    }

    s.push('\n');
    s.push_str(LIST_CONTRACT);
    s
}

/// Rewrite prompt for one violating candidate.
///
/// `others` are the remaining two texts of the frozen round snapshot.
pub fn build_rewrite_prompt(
    brief: &AdBrief,
    original: &str,
    reasons: &str,
    others: &[&str],
    cfg: &PipelineConfig,
) -> String {
    let mut s = String::with_capacity(1536);

    writeln!(
        s,
        "너는 10년 경력의 퍼포먼스 광고 카피라이터다.\n\
아래 문구를 규칙에 맞게 더 강하게 재작성한다. (의미는 유지, 후킹 강화)\n\n\
반드시 지킬 규칙:\n\
- 공백 포함 {}자 이내\n\
- 금칙어 절대 금지: {}\n\
- 아래 두 문구와 겹치는 단어/표현은 피하고 완전히 다른 느낌으로\n\
- 설명/소개형 금지, 리듬감 있게 끊기\n\n\
광고 정보:",
        cfg.max_chars,
        cfg.banned_words.join(", ")
    )
    .ok();
    push_brief(&mut s, brief);

    let other = |i: usize| others.get(i).map(|t| one_line(t)).unwrap_or_default();
    writeln!(
        s,
        "\n재작성 사유: {reasons}\n\n기존 문구: {}\n다른 문구1: {}\n다른 문구2: {}\n",
        one_line(original),
        other(0),
        other(1)
    )
    .ok();

    s.push_str(SINGLE_CONTRACT);
    s
}

fn push_brief(s: &mut String, brief: &AdBrief) {
    writeln!(s, "제품명: {}", brief.product).ok();
    writeln!(s, "핵심 베네핏: {}", brief.benefit).ok();
    writeln!(s, "타겟 상황/고통: {}", brief.pain_point).ok();
    if let Some(p) = &brief.promotion {
        writeln!(s, "프로모션/가격: {p}").ok();
    }
    if let Some(t) = &brief.tone_guide {
        writeln!(s, "금지 표현/톤 가이드: {t}").ok();
    }
}

/// Quoted texts stay on one line.
fn one_line(t: &str) -> String {
    t.replace(['\r', '\n'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::clean;

    fn brief() -> AdBrief {
        AdBrief {
            product: "꿀잠 베개".into(),
            benefit: "5분 만에 숙면".into(),
            pain_point: "새벽까지 뒤척임".into(),
            promotion: Some("첫 구매 30% 할인".into()),
            tone_guide: None,
        }
    }

    #[test]
    fn base_prompt_carries_inputs_and_contract() {
        let cfg = PipelineConfig::default();
        let p = build_base_prompt(&brief(), &cfg);
        assert!(p.contains("제품명: 꿀잠 베개"));
        assert!(p.contains("프로모션/가격: 첫 구매 30% 할인"));
        assert!(!p.contains("금지 표현/톤 가이드"));
        assert!(p.contains("공백 포함 30자 이내"));
        assert!(p.contains("놓치지 마세요"));
        assert!(p.trim_end().ends_with("다른 텍스트는 절대 출력하지 않는다."));
    }

    #[test]
    fn selection_prompt_numbers_candidates() {
        let cfg = PipelineConfig::default();
        let pool = clean(vec![vec!["하나".to_string(), "둘".to_string()]], &cfg);
        let p = build_selection_prompt(&brief(), &pool, &cfg);
        assert!(p.contains("후보 목록(여기서만 선택):\n1) 하나\n2) 둘\n"));
        assert!(p.contains("adTexts"));
    }

    #[test]
    fn rewrite_prompt_flattens_newlines_and_tolerates_missing_others() {
        let cfg = PipelineConfig::default();
        let p = build_rewrite_prompt(&brief(), "줄\n바꿈", "30자 초과", &["다른 하나"], &cfg);
        assert!(p.contains("재작성 사유: 30자 초과"));
        assert!(p.contains("기존 문구: 줄 바꿈\n"));
        assert!(p.contains("다른 문구1: 다른 하나\n"));
        assert!(p.contains("다른 문구2: \n"));
        assert!(p.contains("키는 adText 하나만"));
    }
}
