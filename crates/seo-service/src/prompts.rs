use crate::generation::PromptTemplate;

pub const RELATED_KEYWORDS: PromptTemplate = PromptTemplate::new(
    "related_keywords",
    "Generate 3-5 keywords related to: {seed_keyword}",
);

pub const SEO_TITLES: PromptTemplate = PromptTemplate::new(
    "seo_titles",
    "Generate 2-3 SEO-optimized titles for the keyword: {keyword}",
);

pub const TOPIC_IDEAS: PromptTemplate = PromptTemplate::new(
    "topic_ideas",
    "Generate 1-2 topic ideas or a blog outline for the title: {title}",
);

pub const SHORT_CONTENT: PromptTemplate = PromptTemplate::new(
    "short_content",
    r#"You are a professional SEO copywriter. Your job is to write engaging, concise, and SEO-optimized short content.

Write a short blog introduction (100–200 words) for the topic: "{topic}".

The content must include the exact keyword: "{keyword}" within the **first sentence**, and use it naturally at least **once more** in the body.

Keep the tone professional and clear. Avoid repeating the keyword unnecessarily.

The content should be engaging and suitable for online readers."#,
);

pub const SEO_SCORE: PromptTemplate = PromptTemplate::new(
    "seo_score",
    r#"
Analyze the following text for SEO effectiveness based on the primary keyword.
Provide a score from 0 to 100, where 100 is perfectly optimized.
Consider factors like keyword density (without overstuffing), keyword placement (titles, headings, early paragraphs),
relevance of the content to the keyword, and overall readability.
Do not provide any explanation, just the score.

Keyword: {keyword}
Text:
---
{text_content}
---
Score:
"#,
);
