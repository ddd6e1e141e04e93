//! 提示词构建 - 业务能力层
//!
//! 纯字符串模板，没有 I/O。两套模板互相独立，由调用方选择：
//! - 多组件分析提示词（media_segments / sentiment / platform_heat_spike_map）
//! - 固定五段式品牌报告提示词

/// 问题分类及其问题模板，`{brand}` 为占位符
pub const QUESTION_CATALOGUE: [(&str, [&str; 3]); 4] = [
    (
        "Media Presence",
        [
            "Which media outlets have reported on {brand} in the past 3 months?",
            "In which media has {brand} been mentioned most frequently in recent months?",
            "How has {brand}'s media presence developed over the last 6 months?",
        ],
    ),
    (
        "Sentiment Analysis",
        [
            "How positive or negative has the media coverage about {brand} been in recent months?",
            "What is the overall tonality of the coverage about {brand}?",
            "Are there any indications of potential crises or negative topics {brand} should proactively address?",
        ],
    ),
    (
        "Competitor Analysis",
        [
            "How does {brand} compare to competitors in media coverage and sentiment?",
            "Which topics are {brand}'s competitors currently focusing on?",
            "How often is {brand} mentioned compared to competitors?",
        ],
    ),
    (
        "Topic Trends",
        [
            "Which topics had the biggest impact on {brand} in recent months?",
            "What are the dominant topics in {brand}'s industry right now?",
            "Which societal and economic issues are gaining importance for {brand}?",
        ],
    ),
];

/// 选中的问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionChoice {
    pub category: &'static str,
    pub template: &'static str,
}

impl QuestionChoice {
    /// 按序号轮换选择：先轮换分类，再轮换分类内的问题
    pub fn rotate(index: usize) -> Self {
        let (category, questions) = QUESTION_CATALOGUE[index % QUESTION_CATALOGUE.len()];
        let template = questions[(index / QUESTION_CATALOGUE.len()) % questions.len()];
        Self { category, template }
    }

    pub fn question_for(&self, brand: &str) -> String {
        fill_brand(self.template, brand)
    }
}

/// 替换模板中的 `{brand}`
pub fn fill_brand(template: &str, brand: &str) -> String {
    template.replace("{brand}", brand)
}

/// 多组件分析提示词
///
/// `question_template` 中的 `{brand}` 会被替换
pub fn build(brand: &str, question_template: &str) -> String {
    let question = fill_brand(question_template, brand);
    format!(
        r#"Generate a comprehensive analysis report for {brand} focusing on the following question:

{question}

Please structure your response as a JSON object with the following three widgets:

1. "media_segments": An analysis of which media outlets, platforms, and channels are discussing {brand}. Include breakdown by media type (online, print, social media, broadcast).

2. "sentiment": A detailed sentiment analysis including:
   - Overall sentiment score (positive, neutral, negative with percentages)
   - Sentiment trends over time
   - Key factors driving positive or negative sentiment
   - Specific examples of positive and negative coverage

3. "platform_heat_spike_map": A geographic and platform-based analysis showing:
   - Which platforms (Twitter/X, LinkedIn, Facebook, Instagram, TikTok, news sites, blogs) have the most activity
   - Which geographic regions show the highest volume of mentions
   - Any notable spikes in volume or engagement
   - Trending hashtags or topics related to {brand}

Return your response in strict JSON format with these exact widget names as top-level keys."#
    )
}

/// 固定五段式品牌报告提示词
pub fn brand_report(brand: &str) -> String {
    format!(
        concat!(
            r#"Generate a detailed report for the brand "{brand}" focusing on the following components (widgets): "#,
            "Leaderboard - list the top 5 influencers or key figures impacting sentiment or market trends. ",
            "Sentiment Summary - provide a summary of the current sentiment (positive, neutral, negative) with explanations. ",
            "Volume Alerts - highlight any significant volume spikes or drops in mentions or discussions about the brand. ",
            "Root Causes - identify main factors or events causing changes in sentiment or volume. ",
            "Heatmap - describe geographic or demographic areas with notable activity or sentiment changes. ",
            "Please return the entire report in the strict JSON format below (do not add extra text outside JSON): ",
            r#"{{"brand": "{brand}", "leaderboard": [], "sentiment_summary": {{}}, "volume_alerts": [], "#,
            r#""root_causes": [], "heatmap": {{}}}}"#,
        ),
        brand = brand
    )
}

/// 品牌新闻检索用的布尔查询
pub fn brand_query(brand: &str) -> String {
    format!(r#"(brand:"{brand}" OR company:"{brand}") AND (news OR announcement OR press)"#)
}
