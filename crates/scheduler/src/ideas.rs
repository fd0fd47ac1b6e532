//! Post idea rotation.

use product_cache::ProductData;
use rand::seq::SliceRandom;
use rand::Rng;

/// Casual first-person post ideas.
pub const POST_IDEAS: [&str; 10] = [
    "yo this app lets the kids send their wish list straight to santa and it's adorable",
    "real talk - holiday giveaways hit different when the whole family can join",
    "just set up our family's santa letters in like two minutes, no more lost envelopes",
    "ngl the referral rewards on this holiday app are kind of wild",
    "been counting down to christmas with the kids and this made it way more fun",
    "if you're stressing about holiday plans, this little app keeps the magic easy",
    "the kids got a video message from santa and their faces were everything",
    "anyone else doing the holiday giveaway? we're on day 3 and loving it",
    "just invited the cousins to our santa spot and now it's a whole competition",
    "real question - why buy another advent calendar when this one is free?",
];

/// Ideas for the next run: the fixed rotation plus one per scraped product title.
#[derive(Debug, Clone)]
pub struct IdeaPool {
    ideas: Vec<String>,
}

impl Default for IdeaPool {
    fn default() -> Self {
        Self {
            ideas: POST_IDEAS.iter().map(|i| i.to_string()).collect(),
        }
    }
}

impl IdeaPool {
    /// Add ideas for every product page with a title.
    pub fn with_products(mut self, products: &ProductData) -> Self {
        self.ideas.extend(
            products
                .values()
                .map(|info| info.title.trim())
                .filter(|title| !title.is_empty())
                .map(|title| format!("just found {} and it's perfect for the holidays", title)),
        );
        self
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }

    /// Pick a random idea.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> &str {
        self.ideas
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(POST_IDEAS[0])
    }
}

/// Instruction text for one scheduled run.
pub fn post_instruction(idea: &str) -> String {
    format!("post a new tweet: {}", idea)
}

#[cfg(test)]
mod tests {
    use super::*;
    use product_cache::ProductInfo;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn info(title: &str) -> ProductInfo {
        ProductInfo {
            content: String::new(),
            title: title.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_products_extend_rotation() {
        let mut products = ProductData::new();
        products.insert("https://santaspot.xyz".to_string(), info("Santa's Spot"));
        products.insert("https://santaspot.xyz/broken".to_string(), info("  "));

        let pool = IdeaPool::default().with_products(&products);
        assert_eq!(pool.len(), POST_IDEAS.len() + 1);

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let idea = pool.pick(&mut rng);
            assert!(!idea.is_empty());
        }
    }

    #[test]
    fn test_post_instruction_is_new_post() {
        let instruction = post_instruction(POST_IDEAS[0]);
        assert!(instruction.starts_with("post a new tweet: yo "));
    }
}
