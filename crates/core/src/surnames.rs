// ABOUTME: Reference set of recognized Chinese surnames (single and compound).
// ABOUTME: Used by the name and surname validation processors.

use std::collections::HashSet;

use once_cell::sync::Lazy;

const SINGLE: &str = "赵钱孙李周吴郑王冯陈褚卫蒋沈韩杨朱秦尤许何吕施张孔曹严华金魏陶姜\
戚谢邹喻柏水窦章云苏潘葛奚范彭郎鲁韦昌马苗凤花方俞任袁柳酆鲍史唐\
费廉岑薛雷贺倪汤滕殷罗毕郝邬安常乐于时傅皮卞齐康伍余元卜顾孟平黄\
和穆萧尹姚邵湛汪祁毛禹狄米贝明臧计伏成戴谈宋茅庞熊纪舒屈项祝董梁\
杜阮蓝闵席季麻强贾路娄危江童颜郭梅盛林刁钟徐邱骆高夏蔡田樊胡凌霍\
虞万支柯昝管卢莫经房裘缪干解应宗丁宣贲邓郁单杭洪包诸左石崔吉钮龚\
程嵇邢滑裴陆荣翁荀羊於惠甄曲家封芮羿储靳汲邴糜松井段富巫乌焦巴弓\
牧隗山谷车侯宓蓬全郗班仰秋仲伊宫宁仇栾暴甘钭厉戎祖武符刘景詹束龙\
叶幸司韶郜黎蓟薄印宿白怀蒲邰从鄂索咸籍赖卓蔺屠蒙池乔阴郁胥能苍双\
闻莘党翟谭贡劳逄姬申扶堵冉宰郦雍却璩桑桂濮牛寿通边扈燕冀郏浦尚农\
温别庄晏柴瞿阎充慕连茹习宦艾鱼容向古易慎戈廖庾终暨居衡步都耿满弘\
匡国文寇广禄阙东欧殳沃利蔚越夔隆师巩厍聂晁勾敖融冷訾辛阚那简饶空\
曾毋沙乜养鞠须丰巢关蒯相查后荆红游竺权逯盖益桓公万俟仉督岳帅缑亢\
况郈有琴归海晋楚闫法汝鄢涂钦商牟佘佴伯赏墨哈谯笪年爱阳佟言福\
付肖覃";

const COMPOUND: &[&str] = &[
    "万俟", "司马", "上官", "欧阳", "夏侯", "诸葛", "闻人", "东方", "赫连", "皇甫", "尉迟",
    "公羊", "澹台", "公冶", "宗政", "濮阳", "淳于", "单于", "太叔", "申屠", "公孙", "仲孙",
    "轩辕", "令狐", "钟离", "宇文", "长孙", "慕容", "鲜于", "闾丘", "司徒", "司空", "亓官",
    "司寇", "子车", "颛孙", "端木", "巫马", "公西", "漆雕", "乐正", "壤驷", "公良", "拓跋",
    "夹谷", "宰父", "谷梁", "段干", "百里", "东郭", "南门", "呼延", "羊舌", "微生", "梁丘",
    "左丘", "东门", "西门", "南宫", "第五",
];

static SINGLE_SET: Lazy<HashSet<char>> = Lazy::new(|| SINGLE.chars().collect());
static COMPOUND_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| COMPOUND.iter().copied().collect());

/// Returns the recognized surname prefix of `name`, preferring compound surnames.
pub fn surname_of(name: &str) -> Option<&str> {
    let mut ends = name.char_indices().map(|(i, c)| i + c.len_utf8());
    let first_end = ends.next()?;
    if let Some(second_end) = ends.next() {
        let pair = &name[..second_end];
        if COMPOUND_SET.contains(pair) {
            return Some(pair);
        }
    }
    let first = &name[..first_end];
    first
        .chars()
        .next()
        .filter(|c| SINGLE_SET.contains(c))
        .map(|_| first)
}

/// True when `surname` is a recognized single or compound surname.
pub fn is_surname(surname: &str) -> bool {
    let mut chars = surname.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => SINGLE_SET.contains(&c),
        (Some(_), Some(_)) => COMPOUND_SET.contains(surname),
        _ => false,
    }
}
