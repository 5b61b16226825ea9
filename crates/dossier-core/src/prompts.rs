//! Instructions and prompt templates for the standard topics.

use dossier_sources::{SourceItem, render_context};

use crate::config::SubjectKind;

pub const OVERVIEW_SYSTEM: &str = "You are a knowledgeable tech writer who explains complex topics \
in an accessible, engaging way. Keep a conversational tone that informs without getting overly technical.";

pub const SENTIMENT_SYSTEM: &str = "You are a social media sentiment analyst who specialises in \
Reddit communities. Give detailed, objective analysis backed by concrete examples. Always include a \
numerical sentiment score and cite specific discussions where relevant.";

pub const TECH_STACK_SYSTEM: &str = "You are a senior technology architect who reads a company's \
tech stack for strategic signals. Focus on business implications, scalability and competitive \
advantage, and keep every insight specific and actionable.";

pub const COMPANY_INTEL_SYSTEM: &str = "You are a senior business analyst and corporate \
intelligence expert. Analyse market positioning, competitive advantages, financial signals and \
growth prospects in professional business language, with actionable conclusions.";

pub const NEWS_SYSTEM: &str = "You are a financial journalist and media analyst covering \
corporate news. Explain current events and what they mean for the business, with attention to \
market impact, investor sentiment and strategy.";

pub const NO_DISCUSSIONS_MESSAGE: &str = "No Reddit discussions found for this company.";

const SENTIMENT_SECTIONS: &[&str] = &[
    "**Overall Sentiment Score** (1-10, where 1 is very negative and 10 very positive)",
    "**Key Themes**: what are people mainly talking about?",
    "**Positive Mentions**: what do people like about the company?",
    "**Concerns & Criticisms**: which complaints come up?",
    "**Community Perception**: how does the community see the company overall?",
    "**Trending Topics**: which aspects draw the most discussion?",
];

const TECH_STACK_SECTIONS: &[&str] = &[
    "**Stack Overview**: the main technology choices",
    "**Architecture Assessment**: what the stack says about their technical approach",
    "**Scalability**: how well positioned they are for growth",
    "**Security Posture**: security technologies and practices in evidence",
    "**Performance**: how these choices affect performance",
    "**Innovation Level**: cutting-edge or proven technology",
    "**Cost Efficiency**: what the stack suggests about technical spend",
    "**Team Expertise**: skills the team likely has",
];

const COMPANY_INTEL_SECTIONS: &[&str] = &[
    "**Company Overview**: mission, vision and core business",
    "**Market Position**: industry standing and competitive landscape",
    "**Business Model**: how they make money and create value",
    "**Leadership & Culture**: management and organisational culture",
    "**Financial Health**: revenue trends, funding, profitability where public",
    "**Growth Strategy**: expansion plans and strategic initiatives",
    "**Innovation Focus**: R&D investment and technical direction",
    "**Competitive Advantages**: what sets them apart",
    "**Risks & Challenges**: key business and market risks",
    "**Future Outlook**: where they are likely headed",
];

const NEWS_SECTIONS: &[&str] = &[
    "**Breaking News Summary**: key recent developments",
    "**Media Sentiment**: how the press portrays the company",
    "**Market Impact**: likely effect on the company's prospects",
    "**Industry Implications**: what it means for the wider industry",
    "**Stakeholder Reactions**: investors, customers and partners",
    "**Trend Analysis**: patterns across recent coverage",
    "**Risk Assessment**: PR or business risks",
    "**Competitive Context**: position relative to competitors",
    "**Future Predictions**: what may happen next",
];

fn numbered(sections: &[&str]) -> String {
    sections
        .iter()
        .enumerate()
        .map(|(i, section)| format!("{}. {section}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn overview_prompt(subject: SubjectKind, query: &str) -> String {
    let focus = match subject {
        SubjectKind::Company => {
            "what the organisation does, its mission, key achievements and its impact on its industry"
        }
        SubjectKind::Person => {
            "who they are, what they are known for, key achievements and their influence in their field"
        }
    };
    format!(
        "Write an objective, informative description of {query}. Cover {focus}. \
Make it engaging and educational, around 200-300 words, for a reader who may not know {query}."
    )
}

pub fn sentiment_prompt(query: &str, items: &[SourceItem]) -> String {
    format!(
        "Analyze the sentiment and public opinion about \"{query}\" based on these Reddit discussions:\n\n\
{}\n\nCover the following:\n\n{}\n\n\
Stick to genuine public sentiment and end with actionable insight into how the community perceives the company.",
        render_context(items),
        numbered(SENTIMENT_SECTIONS)
    )
}

pub fn tech_stack_prompt(query: &str, items: &[SourceItem]) -> String {
    let context = if items.is_empty() {
        "No technology data was detected; reason from what is publicly known.".to_string()
    } else {
        render_context(items)
    };
    format!(
        "Analyze the technology stack of \"{query}\" using this detected technology data:\n\n\
{context}\n\nCover the following:\n\n{}\n\n\
Conclude with what these choices reveal about technical maturity, priorities and capabilities.",
        numbered(TECH_STACK_SECTIONS)
    )
}

pub fn company_intel_prompt(query: &str, items: &[SourceItem]) -> String {
    let context = items
        .iter()
        .find(|item| matches!(item, SourceItem::Company(_)))
        .map(|item| format!("Company information:\n{}", item.context_block()))
        .unwrap_or_else(|| {
            "No specific company data available - provide general analysis.".to_string()
        });
    format!(
        "Provide a business intelligence analysis of \"{query}\".\n\n{context}\n\n\
Cover the following:\n\n{}\n\n\
Aim the insight at investors, partners or competitors sizing up the company.",
        numbered(COMPANY_INTEL_SECTIONS)
    )
}

pub fn news_prompt(query: &str, items: &[SourceItem]) -> String {
    let context = if items.is_empty() {
        "No recent coverage was retrieved; summarise what is generally known.".to_string()
    } else {
        render_context(items)
    };
    format!(
        "Analyze recent news and media coverage of \"{query}\" based on these articles and posts:\n\n\
{context}\n\nCover the following:\n\n{}\n\n\
Keep the analysis timely and tie each point to its business implications.",
        numbered(NEWS_SECTIONS)
    )
}
