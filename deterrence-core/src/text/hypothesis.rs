//! Hypothesis classification into paired test narratives.

use serde::Serialize;
use smallvec::smallvec;

use crate::variables::VariableId;

use super::markers::Markers;
use super::variables::recommend_from_markers;
use super::{Narratives, TestNarrative, domain_phrase, team_phrase, variable_count_phrase};

/// Inputs a branch sees.
struct Context<'a> {
    markers: &'a Markers,
    variable_count: usize,
}

impl Context<'_> {
    /// Three or more recommended variables.
    const fn multivariate(&self) -> bool {
        self.variable_count >= 3
    }
}

struct Branch {
    name: &'static str,
    applies: fn(&Context<'_>) -> bool,
    build: fn(&Context<'_>) -> Narratives,
}

const BRANCHES: &[Branch] = &[
    Branch {
        name: "correlation",
        applies: |ctx| {
            ctx.markers.correlation && ctx.variable_count == 2 && !ctx.markers.contrast
        },
        build: correlation,
    },
    Branch {
        name: "two-group",
        applies: |ctx| ctx.markers.two_groups && ctx.variable_count <= 2,
        build: two_groups,
    },
    Branch {
        name: "multi-group",
        applies: |ctx| ctx.markers.multi_groups && ctx.variable_count <= 2,
        build: multi_groups,
    },
    Branch {
        name: "prediction",
        applies: |ctx| ctx.markers.prediction && ctx.variable_count >= 2,
        build: prediction,
    },
    Branch {
        name: "multivariate",
        applies: |ctx| ctx.multivariate() && ctx.markers.two_groups,
        build: multivariate,
    },
    Branch {
        name: "longitudinal",
        applies: |ctx| ctx.markers.time,
        build: longitudinal,
    },
];

fn correlation(ctx: &Context<'_>) -> Narratives {
    let domains = domain_phrase(ctx.markers);
    smallvec![
        TestNarrative::new(
            "Pearson Correlation",
            format!(
                "The hypothesis proposes an association between two continuous measures in {domains}. Pearson's r quantifies the strength and direction of a linear relationship between them."
            ),
            "Extract both variables for every selected session, plot them against each other, and report r with its p-value. Check for outliers and approximate normality before interpreting.",
        ),
        TestNarrative::new(
            "Spearman Rank Correlation",
            "Deterrence scores from a small number of sessions may be skewed or bounded. Spearman's rho tests for a monotonic relationship without assuming normality.",
            "Rank each variable across sessions and correlate the ranks. Report rho alongside Pearson's r; agreement between the two strengthens the conclusion.",
        ),
    ]
}

fn two_groups(ctx: &Context<'_>) -> Narratives {
    let teams = team_phrase(ctx.markers);
    let domains = domain_phrase(ctx.markers);
    smallvec![
        TestNarrative::new(
            "Independent Samples t-test",
            format!(
                "The hypothesis contrasts two groups ({teams}) on a single outcome in {domains}. An independent t-test compares their mean scores."
            ),
            format!(
                "Treat each session's {teams} scores as observations of the two groups, check equality of variances, and report t, degrees of freedom, p and Cohen's d."
            ),
        ),
        TestNarrative::new(
            "Mann-Whitney U Test",
            "With few sessions the normality assumption is hard to verify. The Mann-Whitney U test compares the two groups' rank distributions instead of their means.",
            "Rank all observations together, compare the rank sums of the two groups, and report U with its p-value and an effect size r.",
        ),
    ]
}

fn multi_groups(ctx: &Context<'_>) -> Narratives {
    let teams = team_phrase(ctx.markers);
    smallvec![
        TestNarrative::new(
            "One-Way ANOVA",
            format!(
                "The hypothesis compares {teams} outcomes across three or more groups. A one-way ANOVA tests whether any group mean differs."
            ),
            "Group the observations by domain, test homogeneity of variance, and follow a significant F with Tukey post-hoc comparisons.",
        ),
        TestNarrative::new(
            "Kruskal-Wallis H Test",
            "Domain scores are often skewed and group sizes small. Kruskal-Wallis compares the groups on ranks without assuming normality.",
            "Rank all observations, compare mean ranks across groups, and follow a significant H with Dunn's pairwise tests.",
        ),
    ]
}

fn prediction(ctx: &Context<'_>) -> Narratives {
    let variables = variable_count_phrase(ctx.variable_count);
    smallvec![
        TestNarrative::new(
            "Multiple Regression",
            format!(
                "The hypothesis makes a directional, predictive claim involving {variables}. Multiple regression estimates how much each predictor contributes to the outcome while holding the others constant."
            ),
            "Choose the outcome variable, enter the remaining variables as predictors, and report R squared, standardized coefficients and their p-values. Check multicollinearity and residuals.",
        ),
        TestNarrative::new(
            "Path Analysis",
            "Predictive hypotheses about deterrence often imply a chain of influence rather than independent effects. Path analysis tests direct and indirect effects in that chain.",
            "Draw the hypothesized causal model, estimate each path, and compare model fit indices. Interpret indirect effects only when the direct paths are significant.",
        ),
    ]
}

fn multivariate(ctx: &Context<'_>) -> Narratives {
    let teams = team_phrase(ctx.markers);
    let variables = variable_count_phrase(ctx.variable_count);
    smallvec![
        TestNarrative::new(
            "MANOVA",
            format!(
                "The hypothesis compares {teams} on {variables} at once. MANOVA tests the group difference across all dependent variables jointly and controls the family-wise error rate."
            ),
            "Enter the team as the factor and the selected variables as dependent measures. Report Pillai's trace, then examine univariate follow-ups.",
        ),
        TestNarrative::new(
            "Separate ANOVAs with Bonferroni Correction",
            "When the multivariate assumptions are doubtful, separate ANOVAs per variable remain interpretable provided the significance threshold is corrected for the number of tests.",
            format!(
                "Run one ANOVA per variable and divide alpha by the number of variables ({}). Report which variables survive the corrected threshold.",
                ctx.variable_count.max(1)
            ),
        ),
    ]
}

fn longitudinal(ctx: &Context<'_>) -> Narratives {
    let domains = domain_phrase(ctx.markers);
    smallvec![
        TestNarrative::new(
            "Repeated Measures ANOVA",
            format!(
                "The hypothesis concerns change in {domains} over the course of a game. Repeated measures ANOVA compares the same sessions at several turns."
            ),
            "Use the turn statistics of each session as repeated observations, test sphericity, and apply the Greenhouse-Geisser correction when it is violated.",
        ),
        TestNarrative::new(
            "Mixed-Effects Models",
            "Sessions differ in length and some turns may be missing. Mixed-effects models handle unbalanced repeated measures with session as a random effect.",
            "Model the score as a function of turn with a random intercept per session. Add a random slope for turn if the data support it.",
        ),
    ]
}

fn fallback(ctx: &Context<'_>) -> Narratives {
    let justification = if ctx.variable_count > 0 {
        format!(
            "The hypothesis names {} but no clear comparison or association structure. A t-test is a starting point for comparing the two teams on them.",
            variable_count_phrase(ctx.variable_count)
        )
    } else {
        "No specific variables were identified in the hypothesis. Comparing the two teams' total deterrence is a reasonable starting point.".to_string()
    };
    smallvec![
        TestNarrative::new(
            "Independent Samples t-test",
            justification,
            "Compare NATO and Russia on the chosen measure across the selected sessions and report the mean difference with a confidence interval.",
        ),
        TestNarrative::new(
            "Correlation Analysis",
            "Exploring associations between the recorded variables can clarify which relationships the hypothesis should target.",
            "Compute pairwise correlations between the selected variables and refine the hypothesis around the strongest relationships.",
        ),
    ]
}

/// Paired test narratives for a hypothesis, `None` for blank text.
///
/// `variable_count` is the number of variables recommended for the text,
/// normally `recommend_variables(text).len()`.
#[must_use]
pub fn recommend_tests(text: &str, variable_count: usize) -> Option<Narratives> {
    if text.trim().is_empty() {
        return None;
    }
    Some(classify(&Markers::detect(text), variable_count))
}

fn classify(markers: &Markers, variable_count: usize) -> Narratives {
    let ctx = Context {
        markers,
        variable_count,
    };
    match BRANCHES.iter().find(|branch| (branch.applies)(&ctx)) {
        Some(branch) => {
            log::debug!("hypothesis matched {} branch", branch.name);
            (branch.build)(&ctx)
        }
        None => {
            log::debug!("hypothesis matched no branch, using default narratives");
            fallback(&ctx)
        }
    }
}

/// One hypothesis panel: the text with its variable and test suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HypothesisAnalysis {
    pub text: String,
    pub variables: Vec<VariableId>,
    pub tests: Option<Narratives>,
}

/// Analyze one hypothesis. Every panel runs through here.
#[must_use]
pub fn analyze_hypothesis(text: &str) -> HypothesisAnalysis {
    let markers = Markers::detect(text);
    let variables = recommend_from_markers(text, &markers);
    let tests = (!text.trim().is_empty()).then(|| classify(&markers, variables.len()));
    HypothesisAnalysis {
        text: text.to_string(),
        variables,
        tests,
    }
}
