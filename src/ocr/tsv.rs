//! Parsing of Tesseract's TSV output into line-level text regions.

#![cfg_attr(not(feature = "ocr"), allow(dead_code))]

use crate::models::{BoundingBox, TextRegion};

/// TSV `level` column value for individual words
const WORD_LEVEL: &str = "5";

struct LineAccumulator {
    key: (u32, u32, u32, u32),
    words: Vec<String>,
    confidences: Vec<f32>,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl LineAccumulator {
    fn into_region(self) -> TextRegion {
        let confidence = if self.confidences.is_empty() {
            0.0
        } else {
            self.confidences.iter().sum::<f32>() / self.confidences.len() as f32 / 100.0
        };

        TextRegion {
            bounding_box: BoundingBox::from_rect(self.left, self.top, self.right - self.left, self.bottom - self.top),
            text: self.words.join(" "),
            confidence,
        }
    }
}

/// Group Tesseract's word rows into one region per text line.
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num, left,
/// top, width, height, conf, text. Lines keep the order Tesseract emits them,
/// which is reading order. Malformed rows are skipped.
pub fn parse_tesseract_tsv(tsv: &str) -> Vec<TextRegion> {
    let mut lines: Vec<LineAccumulator> = Vec::new();

    for row in tsv.lines() {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != WORD_LEVEL {
            continue;
        }

        let text = cols[11].trim();
        if text.is_empty() {
            continue;
        }

        let nums: Option<Vec<i64>> = cols[1..10].iter().map(|c| c.trim().parse::<i64>().ok()).collect();
        let Some(nums) = nums else { continue };
        let Ok(conf) = cols[10].trim().parse::<f32>() else { continue };
        if conf < 0.0 {
            continue;
        }

        let key = (nums[0] as u32, nums[1] as u32, nums[2] as u32, nums[3] as u32);
        let (left, top, width, height) = (nums[5] as i32, nums[6] as i32, nums[7] as i32, nums[8] as i32);

        match lines.iter_mut().find(|line| line.key == key) {
            Some(line) => {
                line.words.push(text.to_string());
                line.confidences.push(conf);
                line.left = line.left.min(left);
                line.top = line.top.min(top);
                line.right = line.right.max(left + width);
                line.bottom = line.bottom.max(top + height);
            }
            None => lines.push(LineAccumulator {
                key,
                words: vec![text.to_string()],
                confidences: vec![conf],
                left,
                top,
                right: left + width,
                bottom: top + height,
            }),
        }
    }

    lines.into_iter().map(LineAccumulator::into_region).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t
4\t1\t1\t1\t1\t0\t20\t30\t200\t20\t-1\t
5\t1\t1\t1\t1\t1\t20\t30\t60\t20\t96.5\tPASSPORT
5\t1\t1\t1\t2\t1\t20\t80\t50\t18\t91\tJOHN
5\t1\t1\t1\t2\t2\t80\t78\t70\t22\t89\tSMITH
5\t1\t1\t1\t3\t1\t20\t120\t10\t10\t-1\t
5\t1\t1\t1\t3\t2\t40\t120\tx\t10\t50\tbroken";

    #[test]
    fn test_words_group_into_lines() {
        let regions = parse_tesseract_tsv(SAMPLE);
        assert_eq!(regions.len(), 2);

        assert_eq!(regions[0].text, "PASSPORT");
        assert_eq!(regions[1].text, "JOHN SMITH");
        assert_eq!(regions[1].bounding_box, BoundingBox::from_rect(20, 78, 130, 22));
        assert!((regions[1].confidence - 0.90).abs() < 1e-4);
    }

    #[test]
    fn test_empty_output_has_no_regions() {
        assert!(parse_tesseract_tsv("").is_empty());
        assert!(parse_tesseract_tsv("level\tpage_num\n").is_empty());
    }
}
