use regex::Regex;

/// Scrubs crawled listing text before it is used as prompt context.
///
/// The rules run in a fixed order: markup first, then boilerplate, then
/// whitespace normalization. Later rules assume the earlier ones have
/// already stripped conflicting structure, so the order must not change.
/// Cleaning is idempotent and tolerates the absence of every pattern.
pub struct TextCleaner {
    image_markdown: Regex,
    inline_image_data: Regex,
    profile_links: Regex,
    mentions: Regex,
    ai_disclaimer: Regex,
    site_disclaimer: Regex,
    powered_by: Regex,
    read_more: Regex,
    site_links: Regex,
    markdown_fluff: Regex,
    month_tail: Regex,
    day_tail: Regex,
    blank_lines: Regex,
    space_runs: Regex,
}

impl TextCleaner {
    /// Builds the regex set for one listing site. `site_domain` is the host
    /// whose navigation and profile links should be stripped, e.g.
    /// `www.tripadvisor.com`.
    pub fn new(site_domain: &str) -> Self {
        let domain = regex::escape(site_domain);
        Self {
            image_markdown: Regex::new(r"!\[.*?\]\(.*?\)").unwrap(),
            inline_image_data: Regex::new(r"(?s)\[.*?\]\(data:image/svg.*?\)").unwrap(),
            profile_links: Regex::new(&format!(r"\[.*?\]\(https://{domain}/Profile/.*?\)"))
                .unwrap(),
            mentions: Regex::new(r"@\w+").unwrap(),
            ai_disclaimer: Regex::new(r"(?s)This hotel description was created by AI.*?\.")
                .unwrap(),
            site_disclaimer: Regex::new(r"(?s)Tripadvisor did not create.*?description\.")
                .unwrap(),
            powered_by: Regex::new(r"Powered by AI.*").unwrap(),
            read_more: Regex::new(r"Read more").unwrap(),
            site_links: Regex::new(&format!(r"\[.*?\]\(https://{domain}/.*?\)")).unwrap(),
            markdown_fluff: Regex::new(r"[*]{2,}|#{1,6}|[* ]{3,}").unwrap(),
            month_tail: Regex::new(
                r"\b(January|February|March|April|May|June|July|August|September|October|November|December)\b.*",
            )
            .unwrap(),
            day_tail: Regex::new(r"\b(?:SUN|MON|TUE|WED|THU|FRI|SAT)\b.*").unwrap(),
            blank_lines: Regex::new(r"\n\s*\n").unwrap(),
            space_runs: Regex::new(r" +").unwrap(),
        }
    }

    pub fn clean(&self, raw: &str) -> String {
        let text = self.image_markdown.replace_all(raw, "");
        let text = self.inline_image_data.replace_all(&text, "");
        let text = self.profile_links.replace_all(&text, "");
        let text = self.mentions.replace_all(&text, "");
        let text = self.ai_disclaimer.replace_all(&text, "");
        let text = self.site_disclaimer.replace_all(&text, "");
        let text = self.powered_by.replace_all(&text, "");
        let text = self.read_more.replace_all(&text, "");
        let text = self.site_links.replace_all(&text, "");
        let text = self.markdown_fluff.replace_all(&text, "");
        let text = self.month_tail.replace_all(&text, "");
        let text = self.day_tail.replace_all(&text, "");
        let text = self.blank_lines.replace_all(&text, "\n\n");
        let text = self.space_runs.replace_all(&text, " ");
        text.trim().to_string()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new("www.tripadvisor.com")
    }
}
