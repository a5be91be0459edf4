use super::{KeywordTables, Locative, MatchContext, PaginationWord, SortWord};
use crate::intent::{AggregationType, LogicKind, OperatorKind, SortOrder};

const OPERATORS: &[(&str, OperatorKind)] = &[
    ("=", OperatorKind::Eq),
    ("==", OperatorKind::Eq),
    (":", OperatorKind::Eq),
    ("：", OperatorKind::Eq),
    ("等于", OperatorKind::Eq),
    ("是", OperatorKind::Eq),
    ("eq", OperatorKind::Eq),
    ("is", OperatorKind::Eq),
    ("equals", OperatorKind::Eq),
    ("!=", OperatorKind::Ne),
    ("<>", OperatorKind::Ne),
    ("不等于", OperatorKind::Ne),
    ("不是", OperatorKind::Ne),
    ("ne", OperatorKind::Ne),
    ("is not", OperatorKind::Ne),
    ("not equal", OperatorKind::Ne),
    (">", OperatorKind::Gt),
    ("大于", OperatorKind::Gt),
    ("超过", OperatorKind::Gt),
    ("高于", OperatorKind::Gt),
    ("多于", OperatorKind::Gt),
    ("gt", OperatorKind::Gt),
    ("greater than", OperatorKind::Gt),
    ("more than", OperatorKind::Gt),
    (">=", OperatorKind::Gte),
    ("大于等于", OperatorKind::Gte),
    ("大于或等于", OperatorKind::Gte),
    ("不小于", OperatorKind::Gte),
    ("不低于", OperatorKind::Gte),
    ("至少", OperatorKind::Gte),
    ("gte", OperatorKind::Gte),
    ("ge", OperatorKind::Gte),
    ("<", OperatorKind::Lt),
    ("小于", OperatorKind::Lt),
    ("低于", OperatorKind::Lt),
    ("少于", OperatorKind::Lt),
    ("lt", OperatorKind::Lt),
    ("less than", OperatorKind::Lt),
    ("<=", OperatorKind::Lte),
    ("小于等于", OperatorKind::Lte),
    ("小于或等于", OperatorKind::Lte),
    ("不大于", OperatorKind::Lte),
    ("不超过", OperatorKind::Lte),
    ("不高于", OperatorKind::Lte),
    ("lte", OperatorKind::Lte),
    ("le", OperatorKind::Lte),
    ("包含", OperatorKind::Like),
    ("含有", OperatorKind::Like),
    ("包括", OperatorKind::Like),
    ("类似", OperatorKind::Like),
    ("like", OperatorKind::Like),
    ("contains", OperatorKind::Like),
    ("不包含", OperatorKind::NotLike),
    ("不含", OperatorKind::NotLike),
    ("不包括", OperatorKind::NotLike),
    ("not like", OperatorKind::NotLike),
    ("开头是", OperatorKind::Prefix),
    ("前缀是", OperatorKind::Prefix),
    ("starts with", OperatorKind::Prefix),
    ("prefix", OperatorKind::Prefix),
    ("在", OperatorKind::In),
    ("属于", OperatorKind::In),
    ("in", OperatorKind::In),
    ("不在", OperatorKind::NotIn),
    ("不属于", OperatorKind::NotIn),
    ("not in", OperatorKind::NotIn),
    ("介于", OperatorKind::Between),
    ("between", OperatorKind::Between),
    ("存在", OperatorKind::Exists),
    ("不为空", OperatorKind::Exists),
    ("非空", OperatorKind::Exists),
    ("有值", OperatorKind::Exists),
    ("exists", OperatorKind::Exists),
    ("is not null", OperatorKind::Exists),
    ("不存在", OperatorKind::NotExists),
    ("为空", OperatorKind::NotExists),
    ("是空", OperatorKind::NotExists),
    ("没有值", OperatorKind::NotExists),
    ("无值", OperatorKind::NotExists),
    ("not exists", OperatorKind::NotExists),
    ("is null", OperatorKind::NotExists),
];

const LOGIC: &[(&str, LogicKind)] = &[
    ("并且", LogicKind::And),
    ("同时", LogicKind::And),
    ("还有", LogicKind::And),
    ("以及", LogicKind::And),
    ("而且", LogicKind::And),
    ("and", LogicKind::And),
    ("&&", LogicKind::And),
    ("或", LogicKind::Or),
    ("或者", LogicKind::Or),
    ("or", LogicKind::Or),
    ("||", LogicKind::Or),
];

const DELIMITERS: &[&str] = &[",", "，", "、", ";", "；"];

const AGGREGATIONS: &[(&str, AggregationType, Option<&str>)] = &[
    ("求和", AggregationType::Sum, None),
    ("总和", AggregationType::Sum, None),
    ("合计", AggregationType::Sum, None),
    ("总计", AggregationType::Sum, None),
    ("sum", AggregationType::Sum, None),
    ("平均", AggregationType::Avg, None),
    ("平均值", AggregationType::Avg, None),
    ("均值", AggregationType::Avg, None),
    ("avg", AggregationType::Avg, None),
    ("average", AggregationType::Avg, None),
    ("最小", AggregationType::Min, None),
    ("最小值", AggregationType::Min, None),
    ("最低", AggregationType::Min, None),
    ("min", AggregationType::Min, None),
    ("最大", AggregationType::Max, None),
    ("最大值", AggregationType::Max, None),
    ("最高", AggregationType::Max, None),
    ("max", AggregationType::Max, None),
    ("计数", AggregationType::Count, None),
    ("数量", AggregationType::Count, None),
    ("个数", AggregationType::Count, None),
    ("总数", AggregationType::Count, None),
    ("count", AggregationType::Count, None),
    ("去重计数", AggregationType::Cardinality, None),
    ("去重数", AggregationType::Cardinality, None),
    ("去重", AggregationType::Cardinality, None),
    ("distinct", AggregationType::Cardinality, None),
    ("分组", AggregationType::Terms, None),
    ("分类", AggregationType::Terms, None),
    ("group by", AggregationType::Terms, None),
    ("每分钟", AggregationType::DateHistogram, Some("1m")),
    ("每小时", AggregationType::DateHistogram, Some("1h")),
    ("每天", AggregationType::DateHistogram, Some("1d")),
    ("每日", AggregationType::DateHistogram, Some("1d")),
    ("每周", AggregationType::DateHistogram, Some("1w")),
    ("每月", AggregationType::DateHistogram, Some("1M")),
    ("每年", AggregationType::DateHistogram, Some("1y")),
    ("hourly", AggregationType::DateHistogram, Some("1h")),
    ("daily", AggregationType::DateHistogram, Some("1d")),
    ("weekly", AggregationType::DateHistogram, Some("1w")),
    ("monthly", AggregationType::DateHistogram, Some("1M")),
];

const SORTS: &[(&str, SortWord)] = &[
    ("升序", SortWord::Order(SortOrder::Asc)),
    ("正序", SortWord::Order(SortOrder::Asc)),
    ("从小到大", SortWord::Order(SortOrder::Asc)),
    ("由低到高", SortWord::Order(SortOrder::Asc)),
    ("asc", SortWord::Order(SortOrder::Asc)),
    ("ascending", SortWord::Order(SortOrder::Asc)),
    ("降序", SortWord::Order(SortOrder::Desc)),
    ("倒序", SortWord::Order(SortOrder::Desc)),
    ("逆序", SortWord::Order(SortOrder::Desc)),
    ("从大到小", SortWord::Order(SortOrder::Desc)),
    ("由高到低", SortWord::Order(SortOrder::Desc)),
    ("desc", SortWord::Order(SortOrder::Desc)),
    ("descending", SortWord::Order(SortOrder::Desc)),
    ("排序", SortWord::Generic),
    ("排列", SortWord::Generic),
    ("sort", SortWord::Generic),
];

const SORT_BOUNDARIES: &[&str] = &["按", "按照", "根据", "order by", "sort by"];

const AGGREGATION_HELPERS: &[&str] = &["统计", "计算", "聚合", "汇总"];

const AGGREGATION_SIZE_PREFIXES: &[&str] = &["前", "取前", "限制", "最多", "top"];

const PAGINATION: &[(&str, PaginationWord)] = &[
    ("限制", PaginationWord::Limit),
    ("返回", PaginationWord::Limit),
    ("显示", PaginationWord::Limit),
    ("只要", PaginationWord::Limit),
    ("最多", PaginationWord::Limit),
    ("取", PaginationWord::Limit),
    ("取前", PaginationWord::Limit),
    ("前", PaginationWord::Limit),
    ("limit", PaginationWord::Limit),
    ("top", PaginationWord::Limit),
    ("跳过", PaginationWord::Offset),
    ("偏移", PaginationWord::Offset),
    ("offset", PaginationWord::Offset),
    ("skip", PaginationWord::Offset),
    ("page", PaginationWord::Page),
    ("页码", PaginationWord::Page),
    ("第", PaginationWord::Ordinal),
    ("页", PaginationWord::PageUnit),
    ("每页", PaginationWord::PageSize),
    ("size", PaginationWord::PageSize),
    ("page_size", PaginationWord::PageSize),
    ("pagesize", PaginationWord::PageSize),
    ("从", PaginationWord::From),
    ("from", PaginationWord::From),
    ("继续", PaginationWord::Continue),
    ("接着", PaginationWord::Continue),
    ("下一批", PaginationWord::Continue),
    ("继续查询", PaginationWord::Continue),
    ("continue", PaginationWord::Continue),
    ("search_after", PaginationWord::Continue),
    ("search after", PaginationWord::Continue),
    ("scroll", PaginationWord::Continue),
    ("条", PaginationWord::RecordUnit),
    ("个", PaginationWord::RecordUnit),
    ("行", PaginationWord::RecordUnit),
    ("项", PaginationWord::RecordUnit),
    ("笔", PaginationWord::RecordUnit),
    ("records", PaginationWord::RecordUnit),
    ("rows", PaginationWord::RecordUnit),
    ("开始", PaginationWord::Start),
];

const RANGE_SEPARATORS: &[&str] = &["到", "至", "~", "～", "-", "和"];

const RANGE_CLOSE: &[&str] = &["之间"];

const INDEX_INDICATORS: &[&str] = &["索引", "表", "数据表", "集合", "index", "collection", "table"];

const DEMONSTRATIVES: &[&str] = &["这个", "那个", "这张", "那张", "this", "the"];

const LOCATIVE_PREFIXES: &[&str] = &["在", "从", "from", "in"];

const LOCATIVE_SUFFIXES: &[&str] = &["中", "里", "内"];

const STOP_WORDS: &[&str] = &[
    "查一下", "查询", "查找", "搜索", "帮我", "给我", "找出", "找一下", "一下", "看看", "请",
    "所有", "全部", "的", "please", "show", "find", "search", "query", "get", "list", "me",
    "all", "where", "whose", "with", "which", "that",
];

const DATE_RANGE_LABELS: &[&str] = &[
    "时间范围", "日期范围", "时间段", "时间区间", "日期区间", "时间跨度", "time range", "date range",
];

/// Words the tokenizer only recognizes when a digit follows
const BEFORE_NUMBER: &[&str] = &["前", "第", "取", "取前"];

/// Words the tokenizer only recognizes right after a number
const AFTER_NUMBER: &[&str] = &["条", "个", "行", "项", "笔", "页", "和"];

pub(super) fn build() -> KeywordTables {
    let mut t = KeywordTables::empty();

    for (word, op) in OPERATORS {
        t.add_operator(word, *op);
    }
    for (word, logic) in LOGIC {
        t.add_logic(word, *logic);
    }
    for word in DELIMITERS {
        t.add_delimiter(word);
    }
    for (word, agg, interval) in AGGREGATIONS {
        t.add_aggregation(word, *agg, *interval);
    }
    for (word, sort) in SORTS {
        t.add_sort(word, *sort);
    }
    for word in SORT_BOUNDARIES {
        t.entry_mut(word).sort_boundary = true;
    }
    for word in AGGREGATION_HELPERS {
        t.entry_mut(word).aggregation_helper = true;
    }
    for word in AGGREGATION_SIZE_PREFIXES {
        t.entry_mut(word).aggregation_size_prefix = true;
    }
    for (word, kind) in PAGINATION {
        t.entry_mut(word).pagination = Some(*kind);
    }
    for word in RANGE_SEPARATORS {
        t.entry_mut(word).range_separator = true;
    }
    for word in RANGE_CLOSE {
        t.entry_mut(word).range_close = true;
    }
    for word in INDEX_INDICATORS {
        t.entry_mut(word).index_indicator = true;
    }
    for word in DEMONSTRATIVES {
        t.entry_mut(word).demonstrative = true;
    }
    for word in LOCATIVE_PREFIXES {
        t.entry_mut(word).locative = Some(Locative::Prefix);
    }
    for word in LOCATIVE_SUFFIXES {
        let entry = t.entry_mut(word);
        entry.locative = Some(Locative::Suffix);
        entry.context = MatchContext::AfterIndexIndicator;
    }
    for word in STOP_WORDS {
        t.add_stop_word(word);
    }
    for word in DATE_RANGE_LABELS {
        t.entry_mut(word).date_range_label = true;
    }
    for word in BEFORE_NUMBER {
        t.entry_mut(word).context = MatchContext::BeforeNumber;
    }
    for word in AFTER_NUMBER {
        t.entry_mut(word).context = MatchContext::AfterNumber;
    }

    t
}
