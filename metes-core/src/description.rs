use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bearing::NegativeAngleRule;
use crate::direction::Direction;
use crate::segment::{Segment, TANGENCY_TOLERANCE};

/// 衔接判定所用的"前一段出口切线"如何随遍历推进。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TangentTracking {
    /// 参照值始终停留在初始的 0.0，与既有报告文本逐字一致。
    #[default]
    Frozen,
    /// 每段结束后以该段出口切线作为下一段的参照。
    Threaded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposeOptions {
    pub tangent_tracking: TangentTracking,
    pub tangency_tolerance: f64,
    /// 直线方位与径向线方位中负角的换算方式。
    pub negative_angles: NegativeAngleRule,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            tangent_tracking: TangentTracking::default(),
            tangency_tolerance: TANGENCY_TOLERANCE,
            negative_angles: NegativeAngleRule::default(),
        }
    }
}

/// 一个地块的完整描述：文字元数据、按行进顺序排列的边界段以及面积。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub kind: String,
    pub lot: Option<String>,
    pub block: Option<String>,
    pub subdivision: String,
    pub city: Option<String>,
    pub county: String,
    pub state: String,
    /// 起算点（或引测点）所在的地块角。
    pub start: Direction,
    pub commencement: bool,
    pub area: f64,
    pub area_unit: String,
    pub segments: Vec<Segment>,
}

impl Description {
    /// 以默认选项（冻结切线参照、1e-9 弧度容差、负角反射）生成法律描述文本。
    pub fn render(&self) -> String {
        self.render_with(&ComposeOptions::default())
    }

    pub fn render_with(&self, options: &ComposeOptions) -> String {
        debug!(
            segments = self.segments.len(),
            tracking = ?options.tangent_tracking,
            tolerance = options.tangency_tolerance,
            negative_angles = ?options.negative_angles,
            "组装法律描述"
        );

        let mut text = format!("{} DESCRIPTION:\n\n", self.kind);
        text.push_str(&self.parcel_clause());
        text.push_str(&self.origin_clause());

        let mut previous_tangent = 0.0;
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                let preamble = segment.transition_preamble_with(previous_tangent, options);
                text.push_str(&format!("TO {preamble}; "));
            }
            text.push_str(&format!("THENCE {} ", segment.render_with(options)));
            if options.tangent_tracking == TangentTracking::Threaded {
                previous_tangent = segment.exit_tangent();
            }
        }

        text.push_str(&format!(
            "TO THE POINT OF BEGINNING, CONTAINING {} {} MORE OR LESS.",
            self.area, self.area_unit
        ));
        remove_last_semicolon(&mut text);
        text
    }

    fn parcel_clause(&self) -> String {
        let mut clause = String::from("A PART OF ");
        if let Some(lot) = &self.lot {
            clause.push_str(&format!("LOT {lot}, "));
        }
        if let Some(block) = &self.block {
            clause.push_str(&format!("BLOCK {block}, "));
        }
        clause.push_str(&format!("{} TO ", self.subdivision));
        if let Some(city) = &self.city {
            clause.push_str(&format!("THE CITY OF {city}, "));
        }
        clause.push_str(&format!(
            "{} COUNTY, {}, BEING MORE PARTICULARLY DESCRIBED AS FOLLOWS:\n",
            self.county, self.state
        ));
        clause
    }

    fn origin_clause(&self) -> String {
        let verb = if self.commencement {
            "COMMENCING "
        } else {
            "BEGINNING "
        };
        let mut clause = format!("{verb}AT THE {} CORNER OF SAID LOT", self.start.describe());
        if let Some(lot) = &self.lot {
            clause.push(' ');
            clause.push_str(lot);
        }
        clause.push_str("; ");
        clause
    }
}

/// 删除全文中最后一个分号（按字节位置），无论它属于哪个子句。
fn remove_last_semicolon(text: &mut String) {
    if let Some(index) = text.rfind(';') {
        text.remove(index);
    }
}
