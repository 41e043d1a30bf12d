//! # 数据类型
//!
//! 输入（OSI ground truth）与输出（scene update）共用的基础类型和分类枚举

use std::fmt;

use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 定义一个以 OSI 整数编码反序列化的分类枚举
///
/// 1. `Unknown = 0` 总是存在，超出范围的编码回退到它
/// 2. Display 输出与 OSI 枚举名一致（如 `DASHED_LINE`），用于 metadata
macro_rules! osi_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:expr),* $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash,
            num_enum::FromPrimitive, num_enum::IntoPrimitive,
            strum_macros::Display, strum_macros::EnumString,
            serde::Serialize, serde::Deserialize,
        )]
        #[repr(i32)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        #[serde(from = "i32", into = "i32")]
        pub enum $name {
            #[num_enum(default)]
            Unknown = 0,
            $($variant = $value,)*
        }

        impl Default for $name {
            fn default() -> Self {
                Self::Unknown
            }
        }

        impl $name {
            /// 查表用的下标
            pub fn index(self) -> usize {
                i32::from(self).max(0) as usize
            }
        }

        impl From<$name> for OsiCode<$name> {
            fn from(kind: $name) -> Self {
                Self { code: kind.into(), kind }
            }
        }
    };
}

/// 保留原始整数编码的分类值
///
/// 编码表没收录的值 `kind()` 为 `Unknown`，`code` 保持原样，Display 时直接输出编码
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OsiCode<T> {
    pub code: i32,
    kind: T,
}

impl<T: Copy> OsiCode<T> {
    pub fn kind(&self) -> T {
        self.kind
    }
}

impl<T: From<i32>> From<i32> for OsiCode<T> {
    fn from(code: i32) -> Self {
        Self { code, kind: T::from(code) }
    }
}

impl<T: Copy + Into<i32> + fmt::Display> fmt::Display for OsiCode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: i32 = self.kind.into();
        if known == self.code {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}", self.code)
        }
    }
}

impl<T> Serialize for OsiCode<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code)
    }
}

impl<'de, T: From<i32>> Deserialize<'de> for OsiCode<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::from)
    }
}

pub mod input;

pub mod output;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[display(fmt = "{}", value)]
#[serde(default)]
pub struct Identifier {
    pub value: u64,
}
impl From<u64> for Identifier {
    fn from(value: u64) -> Self {
        Self { value }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Display, Serialize, Deserialize)]
#[display(fmt = "{}, {}, {}", x, y, z)]
#[serde(default)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
impl Vector3d {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// 欧拉角，弧度，按 yaw -> pitch -> roll 的顺序作用
#[derive(Clone, Copy, Debug, Default, PartialEq, Display, Serialize, Deserialize)]
#[display(fmt = "roll: {}, pitch: {}, yaw: {}", roll, pitch, yaw)]
#[serde(default)]
pub struct Orientation3d {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Display, Serialize, Deserialize)]
#[display(fmt = "l: {}, w: {}, h: {}", length, width, height)]
#[serde(default)]
pub struct Dimension3d {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// 输出实体的类别，Display 即实体 id 前缀
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    MovingObject,
    StationaryObject,
    TrafficSign,
    TrafficLight,
    RoadMarking,
    LaneBoundary,
    LogicalLaneBoundary,
    Lane,
    LogicalLane,
}
impl Category {
    /// `前缀_数字id`，同一类别下同一 OSI id 在各帧中得到同一个实体 id
    pub fn entity_id(self, id: Identifier) -> String {
        format!("{}_{}", self, id)
    }
}

osi_enum!(
    /// 交通参与者大类
    MovingObjectType { Other = 1, Vehicle = 2, Pedestrian = 3, Animal = 4 }
);

osi_enum!(
    VehicleType {
        Other = 1,
        SmallCar = 2,
        CompactCar = 3,
        Car = 4,
        LuxuryCar = 5,
        DeliveryVan = 6,
        HeavyTruck = 7,
        Semitrailer = 8,
        Trailer = 9,
        Motorbike = 10,
        Bicycle = 11,
        Bus = 12,
        Tram = 13,
        Train = 14,
        Wheelchair = 15,
        Semitractor = 16,
        StandupScooter = 17,
    }
);

osi_enum!(IndicatorState { Other = 1, Off = 2, Left = 3, Right = 4, Warning = 5 });

osi_enum!(BrakeLightState { Other = 1, Off = 2, Normal = 3, Strong = 4 });

osi_enum!(
    GenericLightState {
        Other = 1,
        Off = 2,
        On = 3,
        FlashingBlue = 4,
        FlashingBlueAndRed = 5,
        FlashingAmber = 6,
    }
);

osi_enum!(
    StationaryObjectType {
        Other = 1,
        Bridge = 2,
        Building = 3,
        Pole = 4,
        Pylon = 5,
        Delineator = 6,
        Tree = 7,
        Barrier = 8,
        Vegetation = 9,
        Curbstone = 10,
        Wall = 11,
        VerticalStructure = 12,
        RectangularStructure = 13,
        OverheadStructure = 14,
        ReflectiveStructure = 15,
        ConstructionSiteElement = 16,
        SpeedBump = 17,
        EmittingStructure = 18,
    }
);

osi_enum!(
    StationaryObjectMaterial {
        Other = 1,
        Wood = 2,
        Plastic = 3,
        Concrete = 4,
        Metal = 5,
        Stone = 6,
        Glas = 7,
        Mud = 8,
    }
);

osi_enum!(
    StationaryObjectDensity {
        Other = 1,
        Solid = 2,
        SmallMesh = 3,
        MediumMesh = 4,
        LargeMesh = 5,
        Open = 6,
    }
);

osi_enum!(
    StationaryObjectColor {
        Other = 1,
        Yellow = 2,
        Green = 3,
        Blue = 4,
        Violet = 5,
        Red = 6,
        Orange = 7,
        Black = 8,
        Grey = 9,
        White = 10,
    }
);

osi_enum!(
    /// 主标志类型的常用编码，其余编码经 `OsiCode` 原样保留
    TrafficSignType {
        Other = 1,
        DangerSpot = 2,
        ZebraCrossing = 87,
        Flight = 110,
        Cattle = 200,
        HorseRiders = 197,
        Amphibians = 188,
        FallingRocks = 96,
        SnowOrIce = 94,
        LooseGravel = 97,
        Waterside = 102,
        Clearance = 210,
        MovableBridge = 98,
        RightBeforeLeftNextIntersection = 3,
        TurnLeft = 4,
        TurnRight = 5,
        DoubleTurnLeft = 6,
        DoubleTurnRight = 7,
        HillDownwards = 8,
        HillUpwards = 9,
        UnevenRoad = 10,
        RoadSlipperyWetOrDirty = 11,
        SideWinds = 12,
        RoadNarrowing = 13,
        Roadworks = 17,
        TrafficQueues = 18,
        TwoWayTraffic = 19,
        AttentionTrafficLight = 20,
        Pedestrians = 21,
        ChildrenCrossing = 22,
        CycleRoute = 23,
        DeerCrossing = 24,
        GiveWay = 125,
        Stop = 126,
        PriorityToOppositeDirection = 127,
        PriorityRoad = 130,
        SpeedLimitBegin = 73,
        SpeedLimitEnd = 74,
        NoEntry = 79,
        NoOvertakingBegin = 80,
    }
);

osi_enum!(
    TrafficLightColor { Other = 1, Red = 2, Yellow = 3, Green = 4, Blue = 5, White = 6 }
);

osi_enum!(
    TrafficLightIcon {
        Other = 1,
        None = 2,
        ArrowStraightAhead = 3,
        ArrowLeft = 4,
        ArrowDiagLeft = 5,
        ArrowStraightAheadLeft = 6,
        ArrowRight = 7,
        ArrowDiagRight = 8,
        ArrowStraightAheadRight = 9,
        ArrowLeftRight = 10,
        ArrowDown = 11,
        ArrowDownLeft = 12,
        ArrowDownRight = 13,
        ArrowCross = 14,
        Pedestrian = 15,
        Walk = 16,
        DontWalk = 17,
        Bicycle = 18,
        PedestrianAndBicycle = 19,
        CountdownSeconds = 20,
        CountdownPercent = 21,
        Tram = 22,
        Bus = 23,
        BusAndTram = 24,
    }
);

osi_enum!(
    TrafficLightMode { Other = 1, Off = 2, Constant = 3, Flashing = 4, Counting = 5 }
);

osi_enum!(
    RoadMarkingType {
        Other = 1,
        PaintedTrafficSign = 2,
        SymbolicTrafficSign = 3,
        TextualTrafficSign = 4,
        GenericSymbol = 5,
        GenericLine = 6,
        GenericText = 7,
    }
);

osi_enum!(
    RoadMarkingColor {
        Other = 1,
        White = 2,
        Yellow = 3,
        Blue = 5,
        Red = 6,
        Green = 7,
        Violet = 8,
        Orange = 9,
    }
);

osi_enum!(
    LaneBoundaryType {
        Other = 1,
        NoLine = 2,
        SolidLine = 3,
        DashedLine = 4,
        BottsDots = 5,
        RoadEdge = 6,
        SnowEdge = 7,
        GrassEdge = 8,
        GravelEdge = 9,
        SoilEdge = 10,
        GuardRail = 11,
        Curb = 12,
        Structure = 13,
        Barrier = 14,
        SoundBarrier = 15,
    }
);

osi_enum!(
    LaneBoundaryColor {
        Other = 1,
        None = 2,
        White = 3,
        Yellow = 4,
        Red = 5,
        Blue = 6,
        Green = 7,
        Violet = 8,
        Orange = 9,
    }
);

osi_enum!(LaneType { Other = 1, Driving = 2, Nondriving = 3, Intersection = 4 });

osi_enum!(
    LaneSubtype {
        Other = 1,
        Normal = 2,
        Biking = 3,
        Sidewalk = 4,
        Parking = 5,
        Stop = 6,
        Restricted = 7,
        Border = 8,
        Shoulder = 9,
        Exit = 10,
        Entry = 11,
        Onramp = 12,
        Offramp = 13,
        Connectingramp = 14,
    }
);

osi_enum!(
    LogicalLaneType {
        Other = 1,
        Normal = 2,
        Biking = 3,
        Sidewalk = 4,
        Parking = 5,
        Stop = 6,
        Restricted = 7,
        Border = 8,
        Shoulder = 9,
        Exit = 10,
        Entry = 11,
        Onramp = 12,
        Offramp = 13,
        Connectingramp = 14,
        Median = 15,
        Curb = 16,
        Rail = 17,
        Tram = 18,
    }
);

osi_enum!(
    MoveDirection { Other = 1, IncreasingS = 2, DecreasingS = 3, BothAllowed = 4 }
);

osi_enum!(
    PassingRule { Other = 1, NoneAllowed = 2, IncreasingT = 3, DecreasingT = 4, BothAllowed = 5 }
);
