use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::keyboard::layout::{ALL_LAYOUTS, LayoutDescriptor, LayoutFamily, REFERENCE_LAYOUT_ID};
use crate::keyboard::mapper::CharacterMapper;

// --- Static Definitions ---

/// One stage of the positional plan, written in reference-layout characters.
pub struct StageDefinition {
    pub name: &'static str,
    pub keys: &'static [char],
    /// Warm-up drills typed on the reference layout.
    pub drills: &'static [&'static str],
}

pub const REFERENCE_STAGES: &[StageDefinition] = &[
    StageDefinition {
        name: "Index Fingers",
        keys: &['f', 'j'],
        drills: &["fff jjj fff jjj", "fj jf fjf jfj fj jf"],
    },
    StageDefinition {
        name: "Middle Fingers",
        keys: &['d', 'k'],
        drills: &["ddd kkk ddd kkk", "fdk jkd dfj kjf dk kd"],
    },
    StageDefinition {
        name: "Ring Fingers",
        keys: &['s', 'l'],
        drills: &["sss lll sss lll", "sdf lkj fds jkl sl ls"],
    },
    StageDefinition {
        name: "Little Fingers",
        keys: &['a', ';'],
        drills: &["aaa ;;; aaa ;;;", "asdf jkl; fdsa ;lkj"],
    },
    StageDefinition {
        name: "Inner Home Row",
        keys: &['g', 'h'],
        drills: &["fgf jhj fgf jhj", "ggg hhh gh hg fghj"],
    },
    StageDefinition {
        name: "Middle Reach Up",
        keys: &['e', 'i'],
        drills: &["ded kik ded kik", "eee iii ei ie die"],
    },
    StageDefinition {
        name: "Index Reach Up",
        keys: &['r', 'u'],
        drills: &["frf juj frf juj", "rrr uuu ru ur rue"],
    },
    StageDefinition {
        name: "Inner Top Row",
        keys: &['t', 'y'],
        drills: &["ftf jyj ftf jyj", "ttt yyy ty yt try"],
    },
    StageDefinition {
        name: "Ring Reach Up",
        keys: &['w', 'o'],
        drills: &["sws lol sws lol", "www ooo wo ow two"],
    },
    StageDefinition {
        name: "Little Reach Up",
        keys: &['q', 'p'],
        drills: &["aqa ;p; aqa ;p;", "qqq ppp qp pq quip"],
    },
    StageDefinition {
        name: "Index Reach Down",
        keys: &['v', 'm'],
        drills: &["fvf jmj fvf jmj", "vvv mmm vm mv vim"],
    },
    StageDefinition {
        name: "Middle Reach Down",
        keys: &['c', ','],
        drills: &["dcd k,k dcd k,k", "ccc ,,, c, ,c cc,"],
    },
    StageDefinition {
        name: "Inner Bottom Row",
        keys: &['b', 'n'],
        drills: &["fbf jnj fbf jnj", "bbb nnn bn nb bin"],
    },
    StageDefinition {
        name: "Ring Reach Down",
        keys: &['x', '.'],
        drills: &["sxs l.l sxs l.l", "xxx ... x. .x ox."],
    },
    StageDefinition {
        name: "Little Reach Down",
        keys: &['z', '/'],
        drills: &["aza ;/; aza ;/;", "zzz /// z/ /z zap"],
    },
];

/// Reference-layout drills for a stage (1-based). Empty for unknown stages.
pub fn reference_drills(stage_id: u32) -> &'static [&'static str] {
    stage_index(stage_id)
        .and_then(|idx| REFERENCE_STAGES.get(idx))
        .map(|def| def.drills)
        .unwrap_or(&[])
}

fn stage_index(stage_id: u32) -> Option<usize> {
    (stage_id as usize).checked_sub(1)
}

// --- Key Stages ---

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStage {
    pub id: u32,
    pub name: String,
    pub new_keys: Vec<char>,
    /// Every key introduced up to and including this stage, in order.
    pub cumulative_keys: Vec<char>,
}

/// A family's ordered stages, built once from the positional plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Curriculum {
    pub family: LayoutFamily,
    pub stages: Vec<KeyStage>,
}

static CURRICULA: LazyLock<Vec<Curriculum>> = LazyLock::new(|| {
    let find = |id: &str| ALL_LAYOUTS.iter().find(|l| l.id == id);
    let Some(reference) = find(REFERENCE_LAYOUT_ID) else {
        return Vec::new();
    };
    LayoutFamily::all()
        .iter()
        .filter_map(|&family| find(family.representative()))
        .map(|representative| Curriculum::project(reference, representative))
        .collect()
});

impl Curriculum {
    pub fn for_family(family: LayoutFamily) -> Option<&'static Curriculum> {
        CURRICULA.iter().find(|c| c.family == family)
    }

    /// Re-expresses the reference plan in `target`'s characters, key by key.
    pub fn project(reference: &LayoutDescriptor, target: &LayoutDescriptor) -> Self {
        let mapper = CharacterMapper::new(reference);
        let definitions = REFERENCE_STAGES.iter().map(|def| {
            (def.name, mapper.transform_chars(def.keys, target))
        });
        Self::from_definitions(target.family, definitions)
    }

    pub fn from_definitions<I>(family: LayoutFamily, definitions: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Vec<char>)>,
    {
        let mut cumulative: Vec<char> = Vec::new();
        let stages = definitions
            .into_iter()
            .enumerate()
            .map(|(idx, (name, new_keys))| {
                for &key in &new_keys {
                    if !cumulative.contains(&key) {
                        cumulative.push(key);
                    }
                }
                KeyStage {
                    id: idx as u32 + 1,
                    name: name.to_string(),
                    new_keys,
                    cumulative_keys: cumulative.clone(),
                }
            })
            .collect();
        Self { family, stages }
    }

    pub fn stage(&self, id: u32) -> Option<&KeyStage> {
        stage_index(id).and_then(|idx| self.stages.get(idx))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
