//! Declarative rule tables for the tension analyzer.
//!
//! Patterns are matched against normalized text (lowercase, straight
//! apostrophes, single spaces). Each table compiles once on first use.

use crate::domain::entities::{EgoFocus, NeedCategory, ResponseOption, TensionBand};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Number of takeaways and options every analysis carries.
pub const CARDINALITY: usize = 3;

/// Family of tension cue. Co-occurrence is counted per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Absolutist,
    Accusation,
    Exclamation,
    Command,
    Softener,
}

impl MarkerKind {
    /// Softeners lower the score; every other kind escalates.
    pub fn escalates(self) -> bool {
        !matches!(self, MarkerKind::Softener)
    }
}

struct MarkerDef {
    kind: MarkerKind,
    pattern: &'static str,
    weight: f32,
    cap: Option<f32>,
}

const fn marker(kind: MarkerKind, pattern: &'static str, weight: f32) -> MarkerDef {
    MarkerDef {
        kind,
        pattern,
        weight,
        cap: None,
    }
}

const MARKER_DEFS: &[MarkerDef] = &[
    marker(MarkerKind::Absolutist, r"\bjamais\b", 1.0),
    marker(MarkerKind::Absolutist, r"\btoujours\b", 1.0),
    marker(MarkerKind::Absolutist, r"\brien\b", 1.0),
    marker(MarkerKind::Absolutist, r"\bencore\b", 1.0),
    marker(MarkerKind::Absolutist, r"\btout le temps\b", 1.0),
    marker(MarkerKind::Absolutist, r"\bà chaque fois\b", 1.0),
    marker(MarkerKind::Accusation, r"\btu ne\b", 1.0),
    marker(MarkerKind::Accusation, r"\btu n'", 1.0),
    marker(MarkerKind::Accusation, r"\bpourquoi\b", 1.0),
    marker(MarkerKind::Accusation, r"\bc'est (?:toujours|encore) moi\b", 1.0),
    marker(MarkerKind::Accusation, r"\bà cause de toi\b", 1.0),
    marker(MarkerKind::Accusation, r"\bc'est (?:de )?ta faute\b", 1.0),
    MarkerDef {
        kind: MarkerKind::Exclamation,
        pattern: r"!",
        weight: 0.5,
        cap: Some(1.5),
    },
    marker(MarkerKind::Command, r"\bstop\b", 1.0),
    marker(MarkerKind::Command, r"\barr[êe]te(?:s|z)?\b", 1.0),
    marker(MarkerKind::Command, r"\btais-toi\b", 1.0),
    marker(MarkerKind::Command, r"\bça suffit\b", 1.0),
    marker(MarkerKind::Command, r"\blaisse-moi tranquille\b", 1.0),
    marker(MarkerKind::Softener, r"\bmerci\b", -1.0),
    marker(MarkerKind::Softener, r"\bj'ai besoin\b", -1.0),
    marker(MarkerKind::Softener, r"\bs'il te pla[iî]t\b", -1.0),
    marker(MarkerKind::Softener, r"\bstp\b", -1.0),
    marker(MarkerKind::Softener, r"\bje t'aime\b", -1.0),
    marker(MarkerKind::Softener, r"\bje comprends\b", -1.0),
];

/// Compiled tension cue.
pub struct Marker {
    pub kind: MarkerKind,
    pub regex: Regex,
    pub weight: f32,
    /// Upper bound on the absolute contribution of this marker.
    pub cap: Option<f32>,
}

impl Marker {
    /// Contribution of this marker to the score for `text`.
    pub fn contribution(&self, text: &str) -> f32 {
        let hits = self.regex.find_iter(text).count();
        if hits == 0 {
            return 0.0;
        }
        let raw = self.weight * hits as f32;
        match self.cap {
            Some(cap) => raw.clamp(-cap, cap),
            None => raw,
        }
    }
}

/// Template for a takeaway plus an option.
pub struct NeedRule {
    pub category: NeedCategory,
    pub trigger: Regex,
    pub takeaway: &'static str,
    pub option: OptionTemplate,
}

#[derive(Debug, Clone, Copy)]
pub struct OptionTemplate {
    pub objective: &'static str,
    pub script: &'static str,
}

impl OptionTemplate {
    pub fn to_option(self) -> ResponseOption {
        ResponseOption {
            objective: self.objective.to_string(),
            script: self.script.to_string(),
        }
    }
}

pub struct EgoRule {
    pub ego: EgoFocus,
    pub trigger: Regex,
}

const BOUNDARY_TRIGGERS: &[&str] = &[
    r"\bstop\b",
    r"\blimites?\b",
    r"\brespecte\w*",
    r"\bne peux (?:pas|plus)\b",
    r"\barr[êe]te(?:s|z)?\b",
    r"\bça suffit\b",
    r"\btais-toi\b",
];

const VALIDATION_TRIGGERS: &[&str] = &[
    r"\bécout\w*",
    r"\bm'entend\w*",
    r"\bcompris\b",
    r"\bcomprendre\b",
    r"\bsoutien\w*",
    r"\bprésente?\b",
    r"\bmerci\b",
    r"\bj'ai besoin\b",
];

const RECOGNITION_TRIGGERS: &[&str] = &[
    r"\bc'est (?:toujours|encore) moi\b",
    r"\bje fais tout\b",
    r"\btout (?:seule?|faire)\b",
    r"\bfai[st] (?:jamais )?rien\b",
    r"\bpersonne ne m'aide\b",
];

pub const DEESCALATION: OptionTemplate = OptionTemplate {
    objective: "Désescalade immédiate",
    script: "Je t'entends. Ce que tu décris est fatigant et blessant, et c'est normal que ça te prenne autant de place. Je propose qu'on fasse une pause de 15 minutes pour que je revienne vers toi avec un plan plus clair, ok ?",
};

const CLARIFY_NEED: OptionTemplate = OptionTemplate {
    objective: "Clarifier le besoin",
    script: "Ce que je comprends : tu as besoin de sentir que je m'implique autant que toi. Voici ce que je te propose : [action concrète], et on fait un point dimanche pour mesurer si ça te soulage.",
};

const PRODUCT_ALIGNMENT: OptionTemplate = OptionTemplate {
    objective: "Alignement produit",
    script: "Scénario 1 : je fais [action], scénario 2 : on pose ensemble une autre manière de gérer [sujet]. Donne-moi ton feedback : quel MVP te semble le plus aligné avec ton besoin là tout de suite ?",
};

pub static TENSION_MARKERS: LazyLock<Vec<Marker>> = LazyLock::new(|| {
    MARKER_DEFS
        .iter()
        .map(|def| Marker {
            kind: def.kind,
            regex: compile(def.pattern),
            weight: def.weight,
            cap: def.cap,
        })
        .collect()
});

/// Need rules in priority order.
pub static NEED_RULES: LazyLock<Vec<NeedRule>> = LazyLock::new(|| {
    vec![
        NeedRule {
            category: NeedCategory::Boundary,
            trigger: compile_any(BOUNDARY_TRIGGERS),
            takeaway: "Une limite claire semble nécessaire. Prépare-la en mode MVP.",
            option: OptionTemplate {
                objective: "Poser une limite",
                script: "Je veux vraiment qu'on avance, et j'ai besoin qu'on évite les généralités type « toujours/jamais ». Ce soir, j'ai l'énergie pour écouter et poser une limite claire : si on dépasse ce ton, je stoppe la discussion et on reprend demain calmement.",
            },
        },
        NeedRule {
            category: NeedCategory::Validation,
            trigger: compile_any(VALIDATION_TRIGGERS),
            takeaway: "La validation émotionnelle doit être la première brique de ta réponse.",
            option: CLARIFY_NEED,
        },
        NeedRule {
            category: NeedCategory::Recognition,
            trigger: compile_any(RECOGNITION_TRIGGERS),
            takeaway: "Le sentiment d'injustice domine : reconnais la charge portée avant de te justifier.",
            option: OptionTemplate {
                objective: "Reconnaître l'effort",
                script: "Tu as raison sur un point : tu as porté beaucoup de choses ces derniers temps. Je ne veux pas compter les points, je veux qu'on rééquilibre. Qu'est-ce qui te soulagerait le plus cette semaine ?",
            },
        },
    ]
});

/// Ego rules; ties between equal hit counts go to the earlier rule.
pub static EGO_RULES: LazyLock<Vec<EgoRule>> = LazyLock::new(|| {
    let table: [(EgoFocus, &[&str]); 5] = [
        (
            EgoFocus::Defensive,
            &[
                r"\bce n'est pas (?:de )?ma faute\b",
                r"\bc'est pas (?:de )?ma faute\b",
                r"\bje me justifie\b",
                r"\bje n'ai rien fait\b",
                r"\bj'ai rien fait\b",
                r"\battaquée?\b",
            ],
        ),
        (
            EgoFocus::Saviour,
            &[
                r"\bje vais (?:tout )?régler\b",
                r"\blaisse-moi faire\b",
                r"\bje m'en occupe\b",
                r"\bje vais t'aider\b",
            ],
        ),
        (
            EgoFocus::Martyr,
            &[
                r"\bc'est (?:toujours|encore) moi\b",
                r"\baprès tout ce que\b",
                r"\bje fais tout\b",
                r"\bje me sacrifie\b",
                r"\bpersonne ne m'aide\b",
            ],
        ),
        (
            EgoFocus::LastWord,
            &[
                r"\bj'ai raison\b",
                r"\btechniquement\b",
                r"\bpour être précise?\b",
            ],
        ),
        (
            EgoFocus::InfluenceRefusal,
            &[
                r"\bpas question\b",
                r"\bhors de question\b",
                r"\bn'importe quoi\b",
                r"\bc'est non\b",
            ],
        ),
    ];
    table
        .into_iter()
        .map(|(ego, patterns)| EgoRule {
            ego,
            trigger: compile_any(patterns),
        })
        .collect()
});

/// Takeaway that depends only on the band.
pub fn band_takeaway(band: TensionBand) -> &'static str {
    match band {
        TensionBand::Low => "Le terrain est calme : profites-en pour co-construire la suite.",
        TensionBand::Moderate => "Valide d'abord, puis propose un plan concret et daté.",
        TensionBand::High => {
            "Ton ego Défensif risque de réagir. Ralentis avant de dérouler ton script."
        }
    }
}

/// Option that depends only on the band.
pub fn band_option(band: TensionBand) -> Option<OptionTemplate> {
    match band {
        TensionBand::High => Some(DEESCALATION),
        TensionBand::Low | TensionBand::Moderate => None,
    }
}

pub const FILLER_TAKEAWAYS: [&str; CARDINALITY] = [
    "Continue de valider avant de proposer la moindre solution.",
    "Propose un plan d'action concret pour la suite.",
    "Ressors la user story cachée pour faire redescendre la tension.",
];

pub const FILLER_OPTIONS: [OptionTemplate; CARDINALITY] =
    [DEESCALATION, PRODUCT_ALIGNMENT, CLARIFY_NEED];

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("static rule pattern should compile")
}

fn compile_any(patterns: &[&str]) -> Regex {
    let alternation = patterns
        .iter()
        .map(|p| format!("(?:{p})"))
        .collect::<Vec<_>>()
        .join("|");
    compile(&alternation)
}
